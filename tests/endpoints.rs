//! Typed endpoint tests against a mock Evergreen server.

use evgapi::{
    builds_by_version, patches_by_project, tasks_by_build, tests_by_task, versions_by_project,
    Build, EvgAuth, EvgClient, EvgError, Get, Manifest, Patch, PatchListQuery, Project, Requester,
    Task, TaskListQuery, TestListQuery, TestResult, Version, VersionListQuery,
};
use futures::TryStreamExt;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(server: &MockServer) -> EvgClient {
    EvgClient::new(EvgAuth::new("someone", "test-key"), &server.uri()).unwrap()
}

fn build_json(id: &str, status: &str) -> serde_json::Value {
    json!({
        "_id": id,
        "project_id": "mongodb",
        "version": "mongodb_abc123",
        "build_variant": "enterprise-rhel",
        "status": status,
        "display_name": "Enterprise RHEL",
        "tasks": ["task_1", "task_2"]
    })
}

fn task_json(id: &str, name: &str) -> serde_json::Value {
    json!({
        "task_id": id,
        "build_id": "build_1",
        "build_variant": "enterprise-rhel",
        "display_name": name,
        "status": "success"
    })
}

#[tokio::test]
async fn test_get_build() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v2/builds/build_1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(build_json("build_1", "success")))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let build = Build::get(&client, "build_1".to_string()).await.unwrap();

    assert_eq!(build.id, "build_1");
    assert!(build.is_completed());
    assert_eq!(build.tasks.len(), 2);
}

#[tokio::test]
async fn test_get_build_error_message_extraction() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v2/builds/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": "build not found"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let err = Build::get(&client, "missing".to_string())
        .await
        .unwrap_err();

    match err {
        EvgError::Api {
            message,
            status_code,
        } => {
            assert_eq!(message, "build not found");
            assert_eq!(status_code, Some(404));
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_tasks_by_build_streams_across_pages() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v2/builds/build_1/tasks"))
        .and(query_param("start", "2"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([task_json("task_3", "lint")])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let next = format!("{}/rest/v2/builds/build_1/tasks?start=2", server.uri());
    Mock::given(method("GET"))
        .and(path("/rest/v2/builds/build_1/tasks"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([
                    task_json("task_1", "compile"),
                    task_json("task_2", "unit-tests")
                ]))
                .insert_header("link", format!(r#"<{next}>; rel="next""#).as_str()),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let tasks: Vec<Task> = tasks_by_build(&client, "build_1", TaskListQuery::default())
        .unwrap()
        .try_collect()
        .await
        .unwrap();

    let names: Vec<&str> = tasks.iter().map(|t| t.display_name.as_str()).collect();
    assert_eq!(names, vec!["compile", "unit-tests", "lint"]);
}

#[tokio::test]
async fn test_tasks_by_build_fetch_all_executions() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v2/builds/build_1/tasks"))
        .and(query_param("fetch_all_executions", "1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([task_json("task_1", "compile")])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let query = TaskListQuery {
        fetch_all_executions: true,
        limit: None,
    };
    let tasks: Vec<Task> = tasks_by_build(&client, "build_1", query)
        .unwrap()
        .try_collect()
        .await
        .unwrap();

    assert_eq!(tasks.len(), 1);
}

#[tokio::test]
async fn test_tests_by_task_with_status_filter() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v2/tasks/task_1/tests"))
        .and(query_param("status", "fail"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "task_id": "task_1",
            "status": "fail",
            "test_file": "jstests/core/find.js"
        }])))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let query = TestListQuery {
        status: Some("fail".to_string()),
        limit: None,
    };
    let tests: Vec<TestResult> = tests_by_task(&client, "task_1", query)
        .unwrap()
        .try_collect()
        .await
        .unwrap();

    assert_eq!(tests.len(), 1);
    assert_eq!(tests[0].test_file, "jstests/core/find.js");
}

#[tokio::test]
async fn test_version_and_builds_workflow() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v2/versions/mongodb_abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "version_id": "mongodb_abc123",
            "revision": "abc123",
            "project": "mongodb",
            "status": "success",
            "build_variants_status": [
                {"build_variant": "enterprise-rhel", "build_id": "build_1"}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v2/versions/mongodb_abc123/builds"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([build_json("build_1", "success")])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);

    let version = Version::get(&client, "mongodb_abc123".to_string())
        .await
        .unwrap();
    assert_eq!(
        version.build_id_for_variant("enterprise-rhel"),
        Some("build_1")
    );

    let builds: Vec<Build> = builds_by_version(&client, &version.version_id)
        .unwrap()
        .try_collect()
        .await
        .unwrap();
    assert_eq!(builds.len(), 1);
    assert_eq!(builds[0].id, "build_1");
}

#[tokio::test]
async fn test_versions_by_project_with_requester_filter() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v2/projects/mongodb/versions"))
        .and(query_param("requester", "gitter_request"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "version_id": "mongodb_abc123",
            "status": "success",
            "requester": "gitter_request"
        }])))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let query = VersionListQuery {
        requester: Some(Requester::GitterRequest),
        limit: None,
    };
    let versions: Vec<Version> = versions_by_project(&client, "mongodb", query)
        .unwrap()
        .try_collect()
        .await
        .unwrap();

    assert_eq!(versions.len(), 1);
    assert_eq!(versions[0].requester, Some(Requester::GitterRequest));
}

#[tokio::test]
async fn test_patches_by_project() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v2/projects/mongodb/patches"))
        .and(query_param("limit", "5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "patch_id": "patch_1",
            "description": "try the fix",
            "project_id": "mongodb",
            "status": "created"
        }])))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let query = PatchListQuery { limit: Some(5) };
    let patches: Vec<Patch> = patches_by_project(&client, "mongodb", query)
        .unwrap()
        .try_collect()
        .await
        .unwrap();

    assert_eq!(patches.len(), 1);
    assert_eq!(patches[0].patch_id, "patch_1");
}

#[tokio::test]
async fn test_get_patch_and_manifest() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v2/patches/patch_1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "patch_id": "patch_1",
            "description": "try the fix",
            "project_id": "mongodb",
            "status": "started"
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v2/patches/patch_1/manifest"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "patch_1",
            "project": "mongodb",
            "modules": {}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);

    let patch = Patch::get(&client, "patch_1".to_string()).await.unwrap();
    assert_eq!(patch.to_string(), "patch_1: try the fix");

    let manifest = Manifest::get(&client, patch.patch_id.clone())
        .await
        .unwrap();
    assert_eq!(manifest.project, "mongodb");
}

#[tokio::test]
async fn test_get_project() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v2/projects/mongodb"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "identifier": "mongodb",
            "display_name": "MongoDB",
            "enabled": true
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let project = Project::get(&client, "mongodb".to_string()).await.unwrap();

    assert_eq!(project.display_name, "MongoDB");
    assert!(project.enabled);
}
