//! Integration tests for layer-filter

const PLAN: &str = r#"{
  "baseImage": "eclipse-temurin:17-jre",
  "entrypoint": ["java", "-cp", "/app/classes:/app/libs/*", "com.example.Main"],
  "format": "OCI",
  "layers": [
    {
      "name": "dependencies",
      "entries": [
        { "sourceFile": "m2/foo-1.0.jar", "extractionPath": "/app/libs/foo-1.0.jar" },
        { "sourceFile": "m2/bar-2.0.jar", "extractionPath": "/app/libs/bar-2.0.jar" }
      ]
    },
    {
      "name": "resources",
      "entries": [
        { "sourceFile": "res/a.txt", "extractionPath": "/app/a.txt", "permissions": "644" },
        { "sourceFile": "res/x.yml", "extractionPath": "/app/config/x.yml" },
        { "sourceFile": "res/b.class", "extractionPath": "/app/b.class" }
      ]
    }
  ]
}"#;

mod cli_tests {
    use super::PLAN;
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    fn layer_filter(config: &Path) -> Command {
        let mut cmd = cargo_bin_cmd!("layer-filter");
        cmd.arg("--no-local").arg("--config").arg(config);
        cmd
    }

    fn setup(config: &str) -> (TempDir, PathBuf, PathBuf) {
        let temp = TempDir::new().unwrap();
        let plan = temp.path().join("plan.json");
        let cfg = temp.path().join("config.toml");
        std::fs::write(&plan, PLAN).unwrap();
        std::fs::write(&cfg, config).unwrap();
        (temp, plan, cfg)
    }

    const FILTERS: &str = r#"
[[filter.filters]]
glob = "**/*.txt"
to_layer = "text-files"

[[filter.filters]]
glob = "/app/config/*.yml"
"#;

    #[test]
    fn help_displays() {
        cargo_bin_cmd!("layer-filter")
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("Move, delete, and split"));
    }

    #[test]
    fn version_displays() {
        cargo_bin_cmd!("layer-filter")
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("layer-filter"));
    }

    #[test]
    fn apply_writes_plan_to_stdout() {
        let (_temp, plan, cfg) = setup(FILTERS);

        let output = layer_filter(&cfg)
            .args(["apply", "--plan"])
            .arg(&plan)
            .output()
            .unwrap();
        assert!(output.status.success());

        let out: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
        let names: Vec<&str> = out["layers"]
            .as_array()
            .unwrap()
            .iter()
            .map(|l| l["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["dependencies", "resources", "text-files"]);
        assert_eq!(out["format"], "OCI");
        assert_eq!(out["layers"][1]["entries"][0]["extractionPath"], "/app/b.class");
        assert_eq!(out["layers"][2]["entries"][0]["permissions"], "644");
    }

    #[test]
    fn apply_debug_logs_every_routing_decision() {
        let (_temp, plan, cfg) = setup(FILTERS);

        let output = layer_filter(&cfg)
            .args(["-vv", "apply", "--plan"])
            .arg(&plan)
            .output()
            .unwrap();
        assert!(output.status.success());

        let stderr = String::from_utf8(output.stderr).unwrap();
        assert!(stderr.contains("Keeping /app/b.class in 'resources'"));
        assert!(stderr.contains("Keeping /app/libs/foo-1.0.jar in 'dependencies'"));
        assert!(stderr.contains("Moving /app/a.txt from 'resources' to 'text-files'"));
        assert!(stderr.contains("Deleting /app/config/x.yml from 'resources'"));
    }

    #[test]
    fn apply_writes_output_file() {
        let (temp, plan, cfg) = setup(FILTERS);
        let out_path = temp.path().join("out.json");

        layer_filter(&cfg)
            .args(["apply", "--plan"])
            .arg(&plan)
            .arg("--output")
            .arg(&out_path)
            .assert()
            .success()
            .stdout(predicate::str::contains("text-files"));

        let written = std::fs::read_to_string(&out_path).unwrap();
        assert!(written.contains("\"text-files\""));
        assert!(!written.contains("/app/config/x.yml"));
    }

    #[test]
    fn apply_unconfigured_passes_through() {
        let (_temp, plan, cfg) = setup("");

        let output = layer_filter(&cfg)
            .args(["apply", "--plan"])
            .arg(&plan)
            .output()
            .unwrap();
        assert!(output.status.success());

        let out: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
        let original: serde_json::Value = serde_json::from_str(PLAN).unwrap();
        assert_eq!(out, original);
    }

    #[test]
    fn apply_rejects_builtin_target() {
        let (_temp, plan, cfg) = setup(
            r#"
[[filter.filters]]
glob = "**/*.txt"
to_layer = "dependencies"
"#,
        );

        layer_filter(&cfg)
            .args(["apply", "--plan"])
            .arg(&plan)
            .assert()
            .failure()
            .stderr(predicate::str::contains("built-in layer 'dependencies'"));
    }

    #[test]
    fn apply_splits_parent_dependencies() {
        let (temp, plan, cfg) = setup("");
        let listing = temp.path().join("parent-deps.toml");
        std::fs::write(
            &listing,
            r#"
[[dependency]]
group_id = "com.example"
artifact_id = "foo"
version = "1.0"

[[dependency]]
group_id = "com.example"
artifact_id = "missing"
version = "3.0"
"#,
        )
        .unwrap();
        // Listing path is relative to the config file, not the working dir
        std::fs::write(
            &cfg,
            r#"
[filter]
create_parent_dependency_layers = true

[parent]
group_id = "com.example"
artifact_id = "parent"
version = "1.0"
dependencies = "parent-deps.toml"
"#,
        )
        .unwrap();

        let output = layer_filter(&cfg)
            .current_dir(std::env::temp_dir())
            .args(["-v", "apply", "--plan"])
            .arg(&plan)
            .output()
            .unwrap();
        assert!(output.status.success());

        let out: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
        let names: Vec<&str> = out["layers"]
            .as_array()
            .unwrap()
            .iter()
            .map(|l| l["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["dependencies-parent", "dependencies", "resources"]);

        let stderr = String::from_utf8(output.stderr).unwrap();
        assert!(stderr.contains("Dependency from parent not found: /app/libs/missing-3.0.jar"));
    }

    #[test]
    fn apply_ignores_stale_listing_without_parent_layers() {
        let (_temp, plan, cfg) = setup(
            r#"
[filter]
create_parent_dependency_layers = false

[parent]
dependencies = "no-such-listing.toml"
"#,
        );

        layer_filter(&cfg)
            .args(["apply", "--plan"])
            .arg(&plan)
            .assert()
            .success();
    }

    #[test]
    fn apply_without_parent_fails() {
        let (_temp, plan, cfg) = setup("[filter]\ncreate_parent_dependency_layers = true\n");

        layer_filter(&cfg)
            .args(["apply", "--plan"])
            .arg(&plan)
            .assert()
            .failure()
            .stderr(predicate::str::contains("no parent"))
            .stderr(predicate::str::contains("Hint:"));
    }

    #[test]
    fn apply_missing_plan_fails() {
        let (temp, _plan, cfg) = setup(FILTERS);

        layer_filter(&cfg)
            .args(["apply", "--plan"])
            .arg(temp.path().join("nope.json"))
            .assert()
            .failure()
            .stderr(predicate::str::contains("reading build plan"));
    }

    #[test]
    fn explain_json() {
        let (_temp, plan, cfg) = setup(FILTERS);

        let output = layer_filter(&cfg)
            .args(["explain", "--format", "json", "--plan"])
            .arg(&plan)
            .output()
            .unwrap();
        assert!(output.status.success());

        let decisions: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
        let decisions = decisions.as_array().unwrap();
        assert_eq!(decisions.len(), 5);
        assert_eq!(decisions[2]["decision"]["action"], "move_to");
        assert_eq!(decisions[2]["decision"]["layer"], "text-files");
        assert_eq!(decisions[3]["decision"]["action"], "delete");
        assert_eq!(decisions[4]["decision"]["action"], "keep");
    }

    #[test]
    fn explain_table() {
        let (_temp, plan, cfg) = setup(FILTERS);

        layer_filter(&cfg)
            .args(["explain", "--plan"])
            .arg(&plan)
            .assert()
            .success()
            .stdout(predicate::str::contains("/app/config/x.yml"))
            .stdout(predicate::str::contains("move to text-files"));
    }

    #[test]
    fn config_path() {
        let (_temp, _plan, cfg) = setup("");

        layer_filter(&cfg)
            .args(["config", "path"])
            .assert()
            .success()
            .stdout(predicate::str::contains("config.toml"));
    }

    #[test]
    fn config_show() {
        let (_temp, _plan, cfg) = setup(FILTERS);

        layer_filter(&cfg)
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[general]"))
            .stdout(predicate::str::contains("text-files"));
    }
}

mod extension_tests {
    use super::PLAN;
    use layer_filter::config::FilterConfig;
    use layer_filter::filter::FilterRule;
    use layer_filter::parent::{split_parent_deps, Artifact, ParentDependencyIndex};
    use layer_filter::{
        BuildPlan, FileEntry, Layer, LayerFilterError, LayerFilterExtension, ProjectContext,
    };

    fn paths(layer: &Layer) -> Vec<&str> {
        layer
            .entries
            .iter()
            .map(|e| e.extraction_path.as_str())
            .collect()
    }

    fn filter(rules: Vec<FilterRule>) -> FilterConfig {
        FilterConfig {
            filters: rules,
            create_parent_dependency_layers: false,
        }
    }

    #[test]
    fn move_delete_keep_scenario() {
        let plan = BuildPlan {
            layers: vec![Layer::with_entries(
                "app",
                vec![
                    FileEntry::new("a.txt", "/app/a.txt"),
                    FileEntry::new("x.yml", "/app/config/x.yml"),
                    FileEntry::new("b.class", "/app/b.class"),
                ],
            )],
            ..Default::default()
        };
        let config = filter(vec![
            FilterRule::new("**/*.txt", "text-files"),
            FilterRule::new("/app/config/*.yml", ""),
        ]);

        let out = LayerFilterExtension::new()
            .extend_build_plan(&plan, Some(&config), &ProjectContext::default())
            .unwrap();

        assert_eq!(out.layer_names(), vec!["app", "text-files"]);
        assert_eq!(paths(&out.layers[0]), vec!["/app/b.class"]);
        assert_eq!(paths(&out.layers[1]), vec!["/app/a.txt"]);
    }

    #[test]
    fn builtin_target_produces_no_layers() {
        let plan = BuildPlan::parse(PLAN).unwrap();
        let config = filter(vec![FilterRule::new("**/*.jar", "resources")]);

        let result = LayerFilterExtension::new().extend_build_plan(
            &plan,
            Some(&config),
            &ProjectContext::default(),
        );
        assert!(matches!(
            result,
            Err(LayerFilterError::BuiltInLayerTarget { .. })
        ));
    }

    #[test]
    fn empty_rules_preserve_plan() {
        let plan = BuildPlan::parse(PLAN).unwrap();
        let out = LayerFilterExtension::new()
            .extend_build_plan(&plan, Some(&filter(vec![])), &ProjectContext::default())
            .unwrap();
        assert_eq!(out, plan);
    }

    #[test]
    fn parent_split_scenario() {
        let plan = BuildPlan {
            layers: vec![Layer::with_entries(
                "deps",
                vec![
                    FileEntry::new("foo.jar", "/app/libs/foo-1.0.jar"),
                    FileEntry::new("bar.jar", "/app/libs/bar-2.0.jar"),
                ],
            )],
            ..Default::default()
        };
        let index =
            ParentDependencyIndex::from_artifacts(vec![Artifact::new("g", "foo", "1.0")]).unwrap();

        let (out, missing) = split_parent_deps(&plan, &index);
        assert_eq!(out.layer_names(), vec!["deps-parent", "deps"]);
        assert_eq!(paths(&out.layers[0]), vec!["/app/libs/foo-1.0.jar"]);
        assert_eq!(paths(&out.layers[1]), vec!["/app/libs/bar-2.0.jar"]);
        assert!(missing.is_empty());

        // Absent everywhere: no error, plan only loses nothing
        let absent = BuildPlan {
            layers: vec![Layer::with_entries(
                "deps",
                vec![FileEntry::new("bar.jar", "/app/libs/bar-2.0.jar")],
            )],
            ..Default::default()
        };
        let (out, missing) = split_parent_deps(&absent, &index);
        assert_eq!(out.layer_names(), vec!["deps"]);
        assert_eq!(missing, vec!["/app/libs/foo-1.0.jar"]);
    }
}
