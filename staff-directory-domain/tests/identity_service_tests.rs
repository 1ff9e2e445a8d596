use staff_directory_domain::{
    application::services::IdentityManagementService,
    domain::{
        entities::{attribute_keys, Attributes, NewIdentity, StaffOnboarding, StaffRole},
        errors::{DirectoryError, GatewayError, GatewayOperation},
        validation::ValidationRule,
    },
    infrastructure::adapters::{GatewayCall, InMemoryIdentityGateway},
};
use std::sync::Arc;

mod fixtures;
use fixtures::*;

fn setup() -> (Arc<InMemoryIdentityGateway>, IdentityManagementService) {
    let gateway = Arc::new(InMemoryIdentityGateway::new());
    let service = IdentityManagementService::new(gateway.clone());
    (gateway, service)
}

fn creates(gateway: &InMemoryIdentityGateway) -> usize {
    gateway.count_calls(|call| matches!(call, GatewayCall::Create { .. }))
}

fn groups(names: &[&str]) -> Vec<String> {
    names.iter().map(|g| g.to_string()).collect()
}

// Creation

#[tokio::test]
async fn test_create_identity_with_valid_data() {
    let (gateway, service) = setup();

    let created = service
        .create_identity(&valid_candidate("user123"), true)
        .await
        .unwrap();

    assert_eq!(created.handle, "user123");
    assert!(created.active);
    assert_eq!(
        gateway.calls(),
        vec![GatewayCall::Create {
            handle: "user123".to_string(),
            send_invite: true,
        }]
    );
}

#[tokio::test]
async fn test_create_identity_passes_send_invite_through() {
    let (gateway, service) = setup();

    service
        .create_identity(&valid_candidate("quiet01"), false)
        .await
        .unwrap();

    assert!(matches!(
        gateway.calls().as_slice(),
        [GatewayCall::Create { send_invite: false, .. }]
    ));
}

#[tokio::test]
async fn test_created_identity_never_stores_password_attribute() {
    let (_gateway, service) = setup();

    let created = service
        .create_identity(&valid_candidate("user123"), false)
        .await
        .unwrap();

    assert!(created.attributes.iter().all(|(_, v)| v != VALID_PASSWORD));
}

#[tokio::test]
async fn test_create_fails_on_invalid_handle_without_gateway_call() {
    let (gateway, service) = setup();

    for handle in ["user con espacios!", "abcdefghijklmnop", ""] {
        let err = service
            .create_identity(&valid_candidate(handle), true)
            .await
            .unwrap_err();

        assert_eq!(err.rule(), Some(ValidationRule::Handle));
        assert!(err.to_string().to_lowercase().contains("username"));
    }
    assert_eq!(gateway.call_count(), 0);
}

#[tokio::test]
async fn test_create_fails_on_invalid_email() {
    let (gateway, service) = setup();

    let err = service
        .create_identity(&candidate_with(attribute_keys::EMAIL, "invalid-email"), true)
        .await
        .unwrap_err();

    assert!(err.to_string().to_lowercase().contains("email is not valid"));
    assert_eq!(creates(&gateway), 0);
}

#[tokio::test]
async fn test_create_fails_on_long_phone() {
    let (gateway, service) = setup();

    let err = service
        .create_identity(
            &candidate_with(attribute_keys::PHONE_NUMBER, "1234567890123"),
            true,
        )
        .await
        .unwrap_err();

    assert!(err
        .to_string()
        .to_lowercase()
        .contains("phone must have 1 to 10 digits"));
    assert_eq!(creates(&gateway), 0);
}

#[tokio::test]
async fn test_create_fails_on_long_address() {
    let (gateway, service) = setup();

    let err = service
        .create_identity(
            &candidate_with(
                attribute_keys::ADDRESS,
                "Esta dirección es demasiado larga para ser válida 123456789",
            ),
            true,
        )
        .await
        .unwrap_err();

    assert!(err
        .to_string()
        .to_lowercase()
        .contains("address must be <= 30 characters"));
    assert_eq!(creates(&gateway), 0);
}

#[tokio::test]
async fn test_create_fails_on_birthdate_problems() {
    let (gateway, service) = setup();

    let missing = service
        .create_identity(&candidate_without(attribute_keys::BIRTHDATE), true)
        .await
        .unwrap_err();
    assert!(missing
        .to_string()
        .to_lowercase()
        .contains("birthdate is required"));

    let wrong_format = service
        .create_identity(&candidate_with(attribute_keys::BIRTHDATE, "1990-01-01"), true)
        .await
        .unwrap_err();
    assert!(wrong_format.to_string().contains("DD/MM/YYYY"));

    let too_old = service
        .create_identity(&candidate_with(attribute_keys::BIRTHDATE, "01/01/1800"), true)
        .await
        .unwrap_err();
    assert!(too_old.to_string().contains("between 0 and 150"));

    assert_eq!(creates(&gateway), 0);
}

#[tokio::test]
async fn test_create_fails_on_weak_password() {
    let (gateway, service) = setup();

    let candidate = NewIdentity::new("user123", valid_attributes(), "password1");
    let err = service.create_identity(&candidate, true).await.unwrap_err();

    assert_eq!(err.rule(), Some(ValidationRule::Password));
    assert!(err.to_string().to_lowercase().contains("password"));
    assert_eq!(creates(&gateway), 0);
}

#[tokio::test]
async fn test_create_surfaces_provider_rejection() {
    let (gateway, service) = setup();
    gateway.insert(existing_identity("user123"));

    let err = service
        .create_identity(&valid_candidate("user123"), true)
        .await
        .unwrap_err();

    match err {
        DirectoryError::Provider {
            operation, message, ..
        } => {
            assert_eq!(operation, GatewayOperation::Create);
            assert_eq!(message, "User account already exists");
        }
        other => panic!("Expected provider error, got {other:?}"),
    }
}

// Lifecycle

#[tokio::test]
async fn test_disable_and_enable_toggle_active_flag() {
    let (gateway, service) = setup();
    gateway.insert(existing_identity("doc01"));

    service.disable_identity("doc01").await.unwrap();
    assert!(!gateway.stored("doc01").unwrap().active);

    // Disabling twice is left to the provider, which accepts it
    service.disable_identity("doc01").await.unwrap();

    service.enable_identity("doc01").await.unwrap();
    assert!(gateway.stored("doc01").unwrap().active);
}

#[tokio::test]
async fn test_lifecycle_requires_non_empty_handle() {
    let (gateway, service) = setup();

    let err = service.disable_identity("").await.unwrap_err();
    assert_eq!(err.rule(), Some(ValidationRule::HandleRequired));

    let err = service.enable_identity("  ").await.unwrap_err();
    assert_eq!(err.rule(), Some(ValidationRule::HandleRequired));

    assert_eq!(gateway.call_count(), 0);
}

#[tokio::test]
async fn test_disable_unknown_identity_is_not_found() {
    let (_gateway, service) = setup();

    let err = service.disable_identity("ghost").await.unwrap_err();
    assert!(matches!(err, DirectoryError::NotFound { ref handle } if handle == "ghost"));
}

// Passwords

#[tokio::test]
async fn test_set_permanent_password() {
    let (gateway, service) = setup();
    gateway.insert(existing_identity("doc01"));

    service
        .set_permanent_password("doc01", "N3w-Secret")
        .await
        .unwrap();

    assert_eq!(
        gateway.password_of("doc01"),
        Some(("N3w-Secret".to_string(), true))
    );
}

#[tokio::test]
async fn test_invalid_password_never_reaches_gateway() {
    let (gateway, service) = setup();
    gateway.insert(existing_identity("doc01"));

    for weak in ["password1", "PASSWORD!", "Sh0rt!", "NoDigits!!", "N0Special1"] {
        let err = service
            .set_permanent_password("doc01", weak)
            .await
            .unwrap_err();
        assert_eq!(err.rule(), Some(ValidationRule::Password), "{weak}");
    }

    assert_eq!(
        gateway.count_calls(|call| matches!(call, GatewayCall::SetPassword { .. })),
        0
    );
}

// Groups

#[tokio::test]
async fn test_add_to_empty_groups_is_a_no_op() {
    let (gateway, service) = setup();

    service.add_to_groups("doc01", &[]).await.unwrap();
    // Emptiness is checked before the handle
    service.add_to_groups("", &[]).await.unwrap();

    assert_eq!(gateway.call_count(), 0);
}

#[tokio::test]
async fn test_add_to_groups_in_order() {
    let (gateway, service) = setup();
    gateway.insert(existing_identity("doc01"));

    service
        .add_to_groups("doc01", &groups(&["doctor", "support"]))
        .await
        .unwrap();

    assert_eq!(
        gateway.calls(),
        vec![
            GatewayCall::AddToGroup {
                handle: "doc01".to_string(),
                group: "doctor".to_string(),
            },
            GatewayCall::AddToGroup {
                handle: "doc01".to_string(),
                group: "support".to_string(),
            },
        ]
    );
    let stored = gateway.stored("doc01").unwrap();
    assert!(stored.is_member_of("doctor") && stored.is_member_of("support"));
}

#[tokio::test]
async fn test_failing_group_is_tagged_and_earlier_groups_stay() {
    let (gateway, service) = setup();
    gateway.insert(existing_identity("doc01"));
    gateway.fail_on_group(
        "B",
        GatewayError::rejected("ResourceNotFoundException", "Group not found."),
    );

    let err = service
        .add_to_groups("doc01", &groups(&["A", "B", "C"]))
        .await
        .unwrap_err();

    match &err {
        DirectoryError::Provider { operation, .. } => {
            assert_eq!(operation, &GatewayOperation::add_to_group("B"));
        }
        other => panic!("Expected provider error, got {other:?}"),
    }

    let count = |name: &str| {
        gateway.count_calls(|call| matches!(call, GatewayCall::AddToGroup { group, .. } if group == name))
    };
    assert_eq!(count("A"), 1);
    assert_eq!(count("B"), 1);
    assert_eq!(count("C"), 0);

    let stored = gateway.stored("doc01").unwrap();
    assert!(stored.is_member_of("A"));
    assert!(!stored.is_member_of("B"));
}

#[tokio::test]
async fn test_list_groups_returns_memberships() {
    let (gateway, service) = setup();
    gateway.insert(existing_identity("nurse01").with_groups(["nurse"]));

    let groups = service.list_groups("nurse01").await.unwrap();
    assert_eq!(groups, vec!["nurse".to_string()]);
}

// Queries

#[tokio::test]
async fn test_find_by_handle() {
    let (gateway, service) = setup();
    gateway.insert(existing_identity("doc01").with_groups(["doctor"]));

    let found = service.find_by_handle("doc01").await.unwrap();
    assert_eq!(found.handle, "doc01");
    assert!(found.is_member_of("doctor"));
    assert_eq!(found.attribute(attribute_keys::EMAIL), Some("user@test.com"));
}

#[tokio::test]
async fn test_find_unknown_handle_is_not_found() {
    let (_gateway, service) = setup();

    let err = service.find_by_handle("ghost").await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_list_delegates_limit_and_filter() {
    let (gateway, service) = setup();
    for handle in ["doc01", "doc02", "nurse01"] {
        gateway.insert(existing_identity(handle));
    }

    let all = service.list(0, None).await.unwrap();
    assert_eq!(all.len(), 3);

    let capped = service.list(2, None).await.unwrap();
    assert_eq!(capped.len(), 2);

    let doctors = service
        .list(10, Some(r#"username ^= "doc""#))
        .await
        .unwrap();
    assert_eq!(doctors.len(), 2);

    assert!(gateway.calls().contains(&GatewayCall::List {
        limit: 10,
        filter: Some(r#"username ^= "doc""#.to_string()),
    }));
}

#[tokio::test]
async fn test_list_failure_is_provider_error() {
    let (gateway, service) = setup();
    gateway.fail_when(
        |call| matches!(call, GatewayCall::List { .. }),
        GatewayError::Timeout { seconds: 30 },
    );

    let err = service.list(10, None).await.unwrap_err();
    assert_eq!(err.operation(), Some(&GatewayOperation::List));
}

#[tokio::test]
async fn test_unclassified_gateway_failure_is_unexpected() {
    let (gateway, service) = setup();
    gateway.fail_when(
        |call| matches!(call, GatewayCall::Get { .. }),
        GatewayError::MalformedResponse {
            message: "missing Username".to_string(),
        },
    );

    let err = service.find_by_handle("doc01").await.unwrap_err();
    assert!(matches!(err, DirectoryError::Unexpected { .. }));
}

// Updates

#[tokio::test]
async fn test_validate_updatable_attributes_checks_present_fields_only() {
    let (_gateway, service) = setup();

    assert!(service
        .validate_updatable_attributes(&Attributes::new())
        .is_ok());
    assert!(service
        .validate_updatable_attributes(&Attributes::new().with(attribute_keys::ADDRESS, "Calle 9"))
        .is_ok());

    let err = service
        .validate_updatable_attributes(
            &Attributes::new().with(attribute_keys::PHONE_NUMBER, "+573001234567"),
        )
        .unwrap_err();
    assert_eq!(err.rule(), Some(ValidationRule::Phone));
}

#[tokio::test]
async fn test_update_attributes_applies_and_refreshes() {
    let (gateway, service) = setup();
    gateway.insert(existing_identity("doc01"));

    let updated = service
        .update_attributes(
            "doc01",
            &Attributes::new().with(attribute_keys::EMAIL, "new@clinic.org"),
        )
        .await
        .unwrap();

    assert_eq!(updated.attribute(attribute_keys::EMAIL), Some("new@clinic.org"));
    assert_eq!(updated.attribute(attribute_keys::ADDRESS), Some("Calle 123"));
}

#[tokio::test]
async fn test_invalid_update_never_reaches_gateway() {
    let (gateway, service) = setup();
    gateway.insert(existing_identity("doc01"));

    let err = service
        .update_attributes(
            "doc01",
            &Attributes::new().with(attribute_keys::BIRTHDATE, "1990-01-01"),
        )
        .await
        .unwrap_err();
    assert_eq!(err.rule(), Some(ValidationRule::BirthdateFormat));

    let err = service
        .update_attributes("doc01", &Attributes::new())
        .await
        .unwrap_err();
    assert_eq!(err.rule(), Some(ValidationRule::EmptyUpdate));

    assert_eq!(gateway.call_count(), 0);
}

#[tokio::test]
async fn test_update_refuses_document_and_role() {
    let (gateway, service) = setup();
    gateway.insert(existing_identity("doc01").with_groups(["nurse"]));

    let err = service
        .update_attributes(
            "doc01",
            &Attributes::new()
                .with(attribute_keys::DOCUMENT, "")
                .with(attribute_keys::ROLE, "DOCTOR"),
        )
        .await
        .unwrap_err();

    assert_eq!(err.rule(), Some(ValidationRule::NotUpdatable));
    assert_eq!(
        gateway.count_calls(|call| matches!(call, GatewayCall::UpdateAttributes { .. })),
        0
    );

    let stored = gateway.stored("doc01").unwrap();
    assert_eq!(stored.attribute(attribute_keys::DOCUMENT), Some("123456789"));
    assert_eq!(stored.attribute(attribute_keys::ROLE), None);
}

// Onboarding

#[tokio::test]
async fn test_onboard_staff_runs_create_group_password_in_order() {
    let (gateway, service) = setup();

    let onboarding = StaffOnboarding::new(valid_candidate("nurse01"), StaffRole::Nurse);
    let onboarded = service.onboard_staff(&onboarding).await.unwrap();

    assert!(onboarded.is_member_of("nurse"));
    assert_eq!(onboarded.attribute(attribute_keys::ROLE), Some("NURSE"));
    assert_eq!(
        gateway.calls(),
        vec![
            GatewayCall::Create {
                handle: "nurse01".to_string(),
                send_invite: false,
            },
            GatewayCall::AddToGroup {
                handle: "nurse01".to_string(),
                group: "nurse".to_string(),
            },
            GatewayCall::SetPassword {
                handle: "nurse01".to_string(),
                permanent: true,
            },
        ]
    );
    assert_eq!(
        gateway.password_of("nurse01"),
        Some((VALID_PASSWORD.to_string(), true))
    );
}

#[tokio::test]
async fn test_onboard_staff_stops_at_failing_group() {
    let (gateway, service) = setup();
    gateway.fail_on_group(
        "humanR",
        GatewayError::rejected("ResourceNotFoundException", "Group not found."),
    );

    let onboarding = StaffOnboarding::new(valid_candidate("hr01"), StaffRole::HumanResources)
        .with_invite(true);
    let err = service.onboard_staff(&onboarding).await.unwrap_err();

    assert_eq!(err.operation(), Some(&GatewayOperation::add_to_group("humanR")));
    // The identity stays created; no compensation is attempted
    assert!(gateway.stored("hr01").is_some());
    assert_eq!(
        gateway.count_calls(|call| matches!(call, GatewayCall::SetPassword { .. })),
        0
    );
}
