use std::sync::Arc;

use petrel_core::contract::{MockPageCreator, MockWorkspaceValidator, UserIntegration};
use petrel_core::error::StagingError;
use petrel_core::models::Destination;
use petrel_core::platform::{Platform, PlatformRegistry, NOTION};
use petrel_core::validate::validate_destinations;
use uuid::Uuid;

fn integration() -> UserIntegration {
    UserIntegration {
        access_token: "secret-token".to_string(),
        drafts_container_id: "drafts-page".to_string(),
    }
}

fn registry_with(validator: MockWorkspaceValidator) -> PlatformRegistry {
    PlatformRegistry::new().register(
        NOTION,
        Platform::new(Arc::new(validator), Arc::new(MockPageCreator::new())),
    )
}

fn destination(platform: &str, workspace_id: &str) -> Destination {
    Destination {
        platform: platform.to_string(),
        workspace_id: workspace_id.to_string(),
        append: false,
        page_id: None,
    }
}

#[tokio::test]
async fn owned_workspace_is_validated_with_its_integration() {
    let user = Uuid::new_v4();
    let mut validator = MockWorkspaceValidator::new();
    validator
        .expect_user_has_workspace()
        .withf(move |u, ws| *u == user && ws == "W1")
        .times(1)
        .returning(|_, _| Ok(Some(integration())));

    let outcome =
        validate_destinations(&registry_with(validator), user, &[destination("notion", "W1")])
            .await;

    assert!(outcome.is_valid());
    let validated = outcome.into_result().unwrap();
    assert_eq!(validated.len(), 1);
    assert_eq!(validated[0].position, 0);
    assert_eq!(validated[0].workspace_id, "W1");
    assert_eq!(validated[0].integration, integration());
}

#[tokio::test]
async fn every_destination_is_checked_and_all_errors_reported() {
    let mut validator = MockWorkspaceValidator::new();
    validator
        .expect_user_has_workspace()
        .times(2)
        .returning(|_, ws| match ws {
            "mine" => Ok(Some(integration())),
            "broken" => Err("directory offline".into()),
            _ => Ok(None),
        });

    let outcome = validate_destinations(
        &registry_with(validator),
        Uuid::new_v4(),
        &[
            destination("confluence", "X"),
            destination("notion", "theirs"),
            destination("notion", "broken"),
        ],
    )
    .await;

    assert_eq!(
        outcome.errors,
        vec![
            "confluence platform does not exist".to_string(),
            "unauthorized access to notion workspace theirs".to_string(),
            "could not verify notion workspace broken: directory offline".to_string(),
        ]
    );
    assert!(outcome.validated.is_empty());
}

#[tokio::test]
async fn append_without_page_id_fails_without_page_lookup() {
    let mut validator = MockWorkspaceValidator::new();
    validator
        .expect_user_has_workspace()
        .returning(|_, _| Ok(Some(integration())));
    validator.expect_is_valid_staging_page().never();

    let mut dest = destination("notion", "W1");
    dest.append = true;
    dest.page_id = Some(String::new());

    let outcome = validate_destinations(&registry_with(validator), Uuid::new_v4(), &[dest]).await;

    assert_eq!(
        outcome.errors,
        vec!["append requested but page_id is missing for platform notion".to_string()]
    );
}

#[tokio::test]
async fn append_checks_the_staging_page() {
    let mut validator = MockWorkspaceValidator::new();
    validator
        .expect_user_has_workspace()
        .returning(|_, _| Ok(Some(integration())));
    validator
        .expect_is_valid_staging_page()
        .returning(|_, page| match page {
            "good" => Ok(true),
            "gone" => Err("404".into()),
            _ => Ok(false),
        });

    let append_to = |page: &str| Destination {
        append: true,
        page_id: Some(page.to_string()),
        ..destination("notion", "W1")
    };

    let outcome = validate_destinations(
        &registry_with(validator),
        Uuid::new_v4(),
        &[append_to("good"), append_to("stale"), append_to("gone")],
    )
    .await;

    assert_eq!(
        outcome.errors,
        vec![
            "page_id stale is not a valid draft for platform notion".to_string(),
            "could not validate page_id gone for notion: 404".to_string(),
        ]
    );
    assert_eq!(outcome.validated["notion"].len(), 1);
    assert_eq!(
        outcome.validated["notion"][0].page_id.as_deref(),
        Some("good")
    );
}

#[tokio::test]
async fn validation_errors_render_as_one_message() {
    let outcome = validate_destinations(
        &PlatformRegistry::new(),
        Uuid::new_v4(),
        &[destination("confluence", "A"), destination("slack", "B")],
    )
    .await;

    let err = outcome.into_result().unwrap_err();
    assert!(matches!(err, StagingError::ValidationFailed(ref errors) if errors.len() == 2));
    assert_eq!(
        err.to_string(),
        "destination validation failed:\n- confluence platform does not exist\n- slack platform does not exist"
    );
}
