//! Backend registration tests
//!
//! Validation must happen before any remote interaction; the mocks panic on
//! unexpected calls, which is exactly the property under test.

use async_trait::async_trait;
use mockall::mock;
use mockall::predicate::eq;

use aliawan::provider::{ComputeDirectory, LoadBalancer, ProviderError};
use aliawan::workflows::{BackendRegistration, RegisterRequest, RegistrationError};

mock! {
    Balancer {}

    #[async_trait]
    impl LoadBalancer for Balancer {
        async fn add_backend(
            &self,
            group_name: &str,
            port: &str,
            instance_id: &str,
        ) -> Result<(), ProviderError>;
    }
}

mock! {
    Compute {}

    #[async_trait]
    impl ComputeDirectory for Compute {
        async fn current_instance_id(&self) -> Result<String, ProviderError>;
    }
}

#[tokio::test]
async fn empty_group_name_fails_before_any_remote_call() {
    let balancer = MockBalancer::new();
    let compute = MockCompute::new();

    let request = RegisterRequest {
        group_name: String::new(),
        port: Some("80".to_string()),
        instance_id: Some("i-1".to_string()),
    };
    let err = BackendRegistration::new(&balancer, &compute)
        .run(&request)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        RegistrationError::MissingParameter("vgroupname")
    ));
}

#[tokio::test]
async fn missing_port_fails_before_any_remote_call() {
    let balancer = MockBalancer::new();
    let compute = MockCompute::new();
    let registration = BackendRegistration::new(&balancer, &compute);

    for port in [None, Some(String::new())] {
        let request = RegisterRequest {
            group_name: "web".to_string(),
            port,
            instance_id: Some("i-1".to_string()),
        };
        let err = registration.run(&request).await.unwrap_err();
        assert!(matches!(err, RegistrationError::MissingParameter("slbport")));
    }
}

#[tokio::test]
async fn explicit_instance_id_skips_metadata_lookup() {
    let mut balancer = MockBalancer::new();
    let compute = MockCompute::new();

    balancer
        .expect_add_backend()
        .with(eq("web"), eq("80"), eq("i-explicit"))
        .times(1)
        .returning(|_, _, _| Ok(()));

    let request = RegisterRequest {
        group_name: "web".to_string(),
        port: Some("80".to_string()),
        instance_id: Some("i-explicit".to_string()),
    };
    let outcome = BackendRegistration::new(&balancer, &compute)
        .run(&request)
        .await
        .unwrap();

    assert_eq!(outcome.instance_id, "i-explicit");
    assert_eq!(outcome.port, "80");
    assert_eq!(outcome.group_name, "web");
}

#[tokio::test]
async fn omitted_instance_id_is_resolved_from_metadata() {
    let mut balancer = MockBalancer::new();
    let mut compute = MockCompute::new();

    compute
        .expect_current_instance_id()
        .times(1)
        .returning(|| Ok("i-meta".to_string()));
    balancer
        .expect_add_backend()
        .with(eq("web"), eq("443"), eq("i-meta"))
        .times(1)
        .returning(|_, _, _| Ok(()));

    let request = RegisterRequest {
        group_name: "web".to_string(),
        port: Some("443".to_string()),
        instance_id: None,
    };
    let outcome = BackendRegistration::new(&balancer, &compute)
        .run(&request)
        .await
        .unwrap();

    assert_eq!(outcome.instance_id, "i-meta");
}

#[tokio::test]
async fn registering_the_same_backend_twice_is_tolerated() {
    let mut balancer = MockBalancer::new();
    let compute = MockCompute::new();

    // The remote treats a duplicate (instance, port) tuple as a no-op; both
    // invocations must succeed from the orchestrator's point of view.
    balancer
        .expect_add_backend()
        .with(eq("web"), eq("80"), eq("i-1"))
        .times(2)
        .returning(|_, _, _| Ok(()));

    let request = RegisterRequest {
        group_name: "web".to_string(),
        port: Some("80".to_string()),
        instance_id: Some("i-1".to_string()),
    };
    let registration = BackendRegistration::new(&balancer, &compute);
    registration.run(&request).await.unwrap();
    registration.run(&request).await.unwrap();
}

#[tokio::test]
async fn metadata_failure_is_surfaced_without_an_add_call() {
    let balancer = MockBalancer::new();
    let mut compute = MockCompute::new();

    compute.expect_current_instance_id().returning(|| {
        Err(ProviderError::InvalidResponse(
            "instance metadata returned an empty instance id".to_string(),
        ))
    });

    let request = RegisterRequest {
        group_name: "web".to_string(),
        port: Some("80".to_string()),
        instance_id: None,
    };
    let err = BackendRegistration::new(&balancer, &compute)
        .run(&request)
        .await
        .unwrap_err();

    assert!(matches!(err, RegistrationError::InstanceLookup(_)));
}
