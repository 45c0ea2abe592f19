//! Tests for Orchestrator runs against the in-memory daemon.

#[cfg(test)]
mod tests {
    use crate::container::{ContainerSpec, Dependency, Mount, MountMode, PortMapping};
    use crate::daemon::fake::{Call, FakeGateway};
    use crate::error::JunbanError;
    use crate::graph::plan;
    use crate::orchestrator::{
        Orchestrator, Phase, Presence, ProvisionResult, RunOptions,
    };
    use std::sync::Arc;

    fn db_and_web() -> Vec<ContainerSpec> {
        vec![
            ContainerSpec::new("db", "postgres:16"),
            ContainerSpec {
                ports: vec![PortMapping::new("0.0.0.0", 8080, 80)],
                mounts: vec![Mount::new("/srv/www", "/var/www", MountMode::ReadOnly)],
                ..ContainerSpec::new("web", "nginx:1.25").depends_on("db")
            },
        ]
    }

    fn images() -> FakeGateway {
        FakeGateway::new()
            .with_image("postgres:16", "sha256:pg")
            .with_image("nginx:1.25", "sha256:nginx")
    }

    fn orchestrator(gateway: &Arc<FakeGateway>) -> Orchestrator {
        Orchestrator::new(gateway.clone(), RunOptions::default())
    }

    #[tokio::test]
    async fn test_create_in_dependency_order() {
        let specs = db_and_web();
        let plan = plan(&specs).unwrap();
        let gateway = Arc::new(images());

        let report = orchestrator(&gateway).run(&specs, &plan, Phase::Create).await;

        assert!(report.is_success());
        assert_eq!(gateway.created(), vec!["db", "web"]);
        assert_eq!(report.summary.to_string(), "Total: 2 (2 created / 0 skipped)");
        assert_eq!(report.outcome("web"), Some(&ProvisionResult::Created));
    }

    #[tokio::test]
    async fn test_create_is_idempotent() {
        let specs = db_and_web();
        let plan = plan(&specs).unwrap();
        let gateway = Arc::new(images());
        let orchestrator = orchestrator(&gateway);

        orchestrator.run(&specs, &plan, Phase::Create).await;
        let before = gateway.mutations().len();

        let report = orchestrator.run(&specs, &plan, Phase::Create).await;

        assert!(report.is_success());
        assert_eq!(gateway.mutations().len(), before);
        assert_eq!(report.summary.to_string(), "Total: 2 (0 created / 2 skipped)");
    }

    #[tokio::test]
    async fn test_image_mismatch_halts_run() {
        let specs = db_and_web();
        let plan = plan(&specs).unwrap();
        let gateway = Arc::new(images().with_container("db", "sha256:stale", false));

        let report = orchestrator(&gateway).run(&specs, &plan, Phase::Create).await;

        assert!(!report.is_success());
        assert!(gateway.mutations().is_empty());
        assert!(report.outcome("web").is_none());
        assert!(matches!(
            report.error,
            Some(JunbanError::ImageMismatch { ref name, .. }) if name == "db"
        ));
    }

    #[tokio::test]
    async fn test_dangling_image_halts_run() {
        let specs = db_and_web();
        let plan = plan(&specs).unwrap();
        let gateway = Arc::new(FakeGateway::new().with_container("db", "sha256:pg", false));

        let report = orchestrator(&gateway).run(&specs, &plan, Phase::Create).await;

        assert!(matches!(
            report.error,
            Some(JunbanError::NoSuchImage { ref image }) if image == "postgres:16"
        ));
        assert!(gateway.created().is_empty());
    }

    #[tokio::test]
    async fn test_create_failure_stops_downstream() {
        let specs = db_and_web();
        let plan = plan(&specs).unwrap();
        let gateway = Arc::new(images().failing_create("db"));

        let report = orchestrator(&gateway).run(&specs, &plan, Phase::Create).await;

        assert_eq!(gateway.created(), vec!["db"]);
        assert!(gateway.container("web").is_none());
        assert_eq!(
            report.summary.to_string(),
            "Total: 2 (0 created / 0 skipped / 1 failed)"
        );
        assert!(report.into_result().is_err());
    }

    #[tokio::test]
    async fn test_start_passes_runtime_options() {
        let specs = db_and_web();
        let plan = plan(&specs).unwrap();
        let gateway = Arc::new(images());
        let orchestrator = orchestrator(&gateway);

        orchestrator.run(&specs, &plan, Phase::Create).await;
        let report = orchestrator.run(&specs, &plan, Phase::Start).await;

        assert!(report.is_success());
        assert_eq!(gateway.started(), vec!["db", "web"]);
        assert!(gateway.container("web").unwrap().running);

        let web_start = gateway
            .calls()
            .into_iter()
            .find_map(|c| match c {
                Call::Start(name, options) if name == "web" => Some(options),
                _ => None,
            })
            .unwrap();
        assert_eq!(web_start.links, vec!["db:db"]);
        assert_eq!(web_start.binds, vec!["/srv/www:/var/www:ro"]);
        assert_eq!(web_start.port_bindings[0].host_port, "8080");
    }

    #[tokio::test]
    async fn test_start_skips_running() {
        let specs = db_and_web();
        let plan = plan(&specs).unwrap();
        let gateway = Arc::new(
            images()
                .with_container("db", "sha256:pg", true)
                .with_container("web", "sha256:nginx", false),
        );

        let report = orchestrator(&gateway).run(&specs, &plan, Phase::Start).await;

        assert_eq!(gateway.started(), vec!["web"]);
        assert_eq!(
            report.outcome("db"),
            Some(&ProvisionResult::SkippedAlreadyRunning)
        );
        assert_eq!(report.summary.to_string(), "Total: 2 (1 started / 1 skipped)");
    }

    #[tokio::test]
    async fn test_start_without_create() {
        let specs = db_and_web();
        let plan = plan(&specs).unwrap();
        let gateway = Arc::new(images());

        let report = orchestrator(&gateway).run(&specs, &plan, Phase::Start).await;

        assert!(matches!(
            report.error,
            Some(JunbanError::MissingContainer { ref name }) if name == "db"
        ));
        assert!(gateway.mutations().is_empty());
    }

    #[tokio::test]
    async fn test_start_failure() {
        let specs = db_and_web();
        let plan = plan(&specs).unwrap();
        let gateway = Arc::new(
            images()
                .with_container("db", "sha256:pg", false)
                .with_container("web", "sha256:nginx", false)
                .failing_start("db"),
        );

        let report = orchestrator(&gateway).run(&specs, &plan, Phase::Start).await;

        assert_eq!(gateway.started(), vec!["db"]);
        assert!(!gateway.container("web").unwrap().running);
        let err = report.error.unwrap();
        assert_eq!(err.exit_code(), crate::error::exit_code::DAEMON_ERROR);
    }

    #[tokio::test]
    async fn test_dry_run_makes_no_changes() {
        let specs = db_and_web();
        let plan = plan(&specs).unwrap();
        let gateway = Arc::new(images().with_container("db", "sha256:pg", false));
        let orchestrator = Orchestrator::new(gateway.clone(), RunOptions { dry_run: true });

        let report = orchestrator.run(&specs, &plan, Phase::Create).await;

        assert!(report.is_success());
        assert!(gateway.mutations().is_empty());
        assert!(gateway.container("web").is_none());
        assert_eq!(report.outcome("web"), Some(&ProvisionResult::Created));
        assert!(report.outcomes.iter().all(|o| o.dry_run));
    }

    #[tokio::test]
    async fn test_multiple_mount_from_uses_last_on_create() {
        let specs = vec![
            ContainerSpec::new("data", "busybox"),
            ContainerSpec::new("assets", "busybox"),
            ContainerSpec {
                mount_from: vec!["data".to_string(), "assets".to_string()],
                dependencies: vec![Dependency::with_alias("data", "store")],
                ..ContainerSpec::new("app", "alpine")
            },
        ];
        let plan = plan(&specs).unwrap();
        let gateway = Arc::new(
            FakeGateway::new()
                .with_image("busybox", "sha256:busybox")
                .with_image("alpine", "sha256:alpine"),
        );
        let orchestrator = orchestrator(&gateway);

        orchestrator.run(&specs, &plan, Phase::Create).await;
        orchestrator.run(&specs, &plan, Phase::Start).await;

        let calls = gateway.calls();
        let create = calls
            .iter()
            .find_map(|c| match c {
                Call::Create(options) if options.name == "app" => Some(options.clone()),
                _ => None,
            })
            .unwrap();
        assert_eq!(create.volumes_from.as_deref(), Some("assets"));

        let start = calls
            .iter()
            .find_map(|c| match c {
                Call::Start(name, options) if name == "app" => Some(options.clone()),
                _ => None,
            })
            .unwrap();
        assert_eq!(start.volumes_from, vec!["data", "assets"]);
        assert_eq!(start.links, vec!["data:store"]);
        assert_eq!(gateway.created().last().map(String::as_str), Some("app"));
    }

    #[test]
    fn test_survey() {
        let specs = db_and_web();
        let plan = plan(&specs).unwrap();
        let gateway = Arc::new(images().with_container("db", "sha256:pg", true));

        let statuses =
            tokio_test::block_on(orchestrator(&gateway).survey(&specs, &plan)).unwrap();

        assert_eq!(statuses.len(), 2);
        assert_eq!(statuses[0].name, "db");
        assert_eq!(statuses[0].presence, Presence::Running);
        assert_eq!(statuses[0].image_matches, Some(true));
        assert_eq!(statuses[1].presence, Presence::Missing);
        assert_eq!(statuses[1].image_matches, None);
        assert!(gateway.mutations().is_empty());
    }
}
