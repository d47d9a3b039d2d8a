//! Integration tests for ocp-client API operations.
//!
//! These tests use wiremock to simulate backend responses and verify
//! that the client correctly handles various API scenarios.

use ocp_client::{Client, ClientError};
use ocp_core::{
    ClusterCreateRequest, ClusterId, ClusterSpec, ClusterUpdate, NodePoolCreateRequest,
    NodePoolId, NodePoolScaling, NodePoolSpec, OcpError, OperationId, OperationStatus,
    ProviderConfig, ResourceApi, Submission,
};
use serde_json::json;
use wiremock::matchers::{body_json, body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> Client {
    let config = ProviderConfig::builder()
        .token("secret-token")
        .endpoint(format!("{}/backend/api", server.uri()))
        .build()
        .unwrap();
    Client::new(&config).unwrap()
}

fn cluster_spec() -> ClusterSpec {
    serde_json::from_value(json!({
        "cluster_name": "prod",
        "cluster_version": "1.29",
        "master_flavor_id": "m1.medium",
        "master_count": 3,
        "image": "ubuntu-22.04",
        "networking": "calico",
        "restriction_api": false,
        "node_pool": [
            {"name": "default", "flavor_id": "m1.large", "node_count": 2, "autoscale": true, "max_count": 4}
        ]
    }))
    .unwrap()
}

#[tokio::test]
async fn test_create_cluster_sends_token_and_default_pool() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/backend/api/cluster/"))
        .and(header("Authorization", "OpenAPIToken secret-token"))
        .and(body_partial_json(json!({
            "cluster_name": "prod",
            "node_pools": [{"name": "default", "count": 2, "is_default": true}]
        })))
        .respond_with(ResponseTemplate::new(202).set_body_json(json!({
            "operation_id": "op-create-1"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client(&mock_server);
    let request = ClusterCreateRequest::from(&cluster_spec());
    let handle = client.create_cluster(&request).await.unwrap();

    assert_eq!(handle.operation_id, OperationId::new("op-create-1"));
}

#[tokio::test]
async fn test_create_cluster_server_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/backend/api/cluster/"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "error": "Internal server error"
        })))
        .mount(&mock_server)
        .await;

    let client = client(&mock_server);
    let request = ClusterCreateRequest::from(&cluster_spec());

    match client.create_cluster(&request).await {
        Err(ClientError::Api { status, message }) => {
            assert_eq!(status, 500);
            assert!(message.contains("Internal server error"));
        }
        other => panic!("Expected API error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_validation_error_uses_detail_field() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PATCH"))
        .and(path("/backend/api/cluster/c-1/"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "detail": "cluster_version 1.10 is not supported"
        })))
        .mount(&mock_server)
        .await;

    let client = client(&mock_server);
    let update = ClusterUpdate {
        cluster_version: Some("1.10".into()),
        ..Default::default()
    };
    let err = client
        .update_cluster(&ClusterId::new("c-1"), &update)
        .await
        .unwrap_err();

    match err {
        ClientError::Api { status, message } => {
            assert_eq!(status, 400);
            assert_eq!(message, "cluster_version 1.10 is not supported");
        }
        other => panic!("Expected API error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_update_cluster_sends_only_changed_fields() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PATCH"))
        .and(path("/backend/api/cluster/c-1/"))
        .and(body_json(json!({
            "restriction_api": true,
            "restriction_ips": ["10.0.0.1"]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "c-1",
            "restriction_api": true,
            "restriction_ips": ["10.0.0.1"],
            "status": "updating"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client(&mock_server);
    let update = ClusterUpdate {
        restriction_api: Some(true),
        restriction_ips: Some(vec!["10.0.0.1".into()]),
        ..Default::default()
    };
    let patch = client
        .update_cluster(&ClusterId::new("c-1"), &update)
        .await
        .unwrap();

    assert_eq!(patch.restriction_api, Some(true));
    assert_eq!(patch.status.as_deref(), Some("updating"));
    assert!(patch.cluster_version.is_none());
}

#[tokio::test]
async fn test_get_cluster_not_found_is_none() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/backend/api/cluster/c-gone/"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "detail": "Not found."
        })))
        .mount(&mock_server)
        .await;

    let client = client(&mock_server);
    let cluster = client.get_cluster(&ClusterId::new("c-gone")).await.unwrap();
    assert!(cluster.is_none());
}

#[tokio::test]
async fn test_get_cluster_malformed_payload() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/backend/api/cluster/c-1/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "cluster_name": "prod"
        })))
        .mount(&mock_server)
        .await;

    let client = client(&mock_server);
    let err = ResourceApi::get_cluster(&client, &ClusterId::new("c-1"))
        .await
        .unwrap_err();
    assert!(matches!(err, OcpError::MalformedResponse(_)));
}

#[tokio::test]
async fn test_operation_lookup_404_surfaces_as_not_found() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/backend/api/operations/op-new"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let client = client(&mock_server);
    let err = ResourceApi::get_operation(&client, &OperationId::new("op-new"))
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_operation_record_decodes() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/backend/api/operations/op-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "op-1",
            "status": "succeeded",
            "operation_type": "create_cluster",
            "primary_object_id": "c-77",
            "progress": {"completed_steps": 4, "steps_details": []}
        })))
        .mount(&mock_server)
        .await;

    let client = client(&mock_server);
    let record = client
        .get_operation(&OperationId::new("op-1"))
        .await
        .unwrap();
    assert_eq!(record.status, OperationStatus::Succeeded);
    assert_eq!(record.primary_object_id.as_deref(), Some("c-77"));
}

#[tokio::test]
async fn test_create_node_pool_synchronous_answer() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/backend/api/node-pool/"))
        .and(body_partial_json(json!({
            "cluster": "c-1",
            "is_default": false,
            "labels": [{"key": "tier", "value": "batch"}]
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": "np-9",
            "name": "batch",
            "count": 1,
            "autoscale": false
        })))
        .mount(&mock_server)
        .await;

    let spec: NodePoolSpec = serde_json::from_value(json!({
        "name": "batch",
        "cluster": "c-1",
        "flavor_id": "m1.small",
        "node_count": 1,
        "autoscale": false,
        "labels": [{"key": "tier", "value": "batch"}]
    }))
    .unwrap();

    let client = client(&mock_server);
    let submission = client
        .create_node_pool(&NodePoolCreateRequest::standalone(&spec))
        .await
        .unwrap();
    assert_eq!(
        submission,
        Submission::Created {
            id: NodePoolId::new("np-9")
        }
    );
}

#[tokio::test]
async fn test_update_node_pool_returns_backend_values() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PATCH"))
        .and(path("/backend/api/node-pool/np-1/"))
        .and(body_json(json!({"count": 5, "autoscale": false, "max_count": 5})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "np-1",
            "name": "p1",
            "count": 4,
            "autoscale": false,
            "max_count": 4,
            "status": "resizing"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client(&mock_server);
    let applied = client
        .update_node_pool(
            &NodePoolId::new("np-1"),
            &NodePoolScaling {
                count: 5,
                autoscale: false,
                max_count: 5,
            },
        )
        .await
        .unwrap();

    assert_eq!(
        applied,
        NodePoolScaling {
            count: 4,
            autoscale: false,
            max_count: 4
        }
    );
}

#[tokio::test]
async fn test_get_node_pool_path_has_no_trailing_slash() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/backend/api/node-pool/np-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "np-1",
            "name": "p1",
            "flavor": "Large",
            "count": 3,
            "autoscale": false,
            "max_count": 3,
            "nodes": [{"id": "n-1", "name": "p1-1", "ready": true, "node_pool": "p1"}]
        })))
        .mount(&mock_server)
        .await;

    let client = client(&mock_server);
    let pool = client
        .get_node_pool(&NodePoolId::new("np-1"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(pool.flavor, "Large");
    assert!(pool.nodes[0].ready);
}

#[tokio::test]
async fn test_delete_node_pool_empty_body_is_synchronous() {
    let mock_server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/backend/api/node-pool/np-1/"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&mock_server)
        .await;

    let client = client(&mock_server);
    let handle = client
        .delete_node_pool(&NodePoolId::new("np-1"))
        .await
        .unwrap();
    assert!(handle.is_none());
}

#[tokio::test]
async fn test_delete_node_pool_with_operation() {
    let mock_server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/backend/api/node-pool/np-2/"))
        .respond_with(ResponseTemplate::new(202).set_body_json(json!({
            "operation_id": "op-del-2"
        })))
        .mount(&mock_server)
        .await;

    let client = client(&mock_server);
    let handle = client
        .delete_node_pool(&NodePoolId::new("np-2"))
        .await
        .unwrap();
    assert_eq!(handle.unwrap().operation_id, OperationId::new("op-del-2"));
}

#[tokio::test]
async fn test_delete_node_pool_bad_operation_id_is_malformed() {
    let mock_server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/backend/api/node-pool/np-1/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "operation_id": 42
        })))
        .mount(&mock_server)
        .await;

    let client = client(&mock_server);
    let err = client
        .delete_node_pool(&NodePoolId::new("np-1"))
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::InvalidResponse(ref msg) if msg.contains("np-1")));

    let err = ResourceApi::delete_node_pool(&client, &NodePoolId::new("np-1"))
        .await
        .unwrap_err();
    assert!(matches!(err, OcpError::MalformedResponse(_)));
}

#[tokio::test]
async fn test_delete_node_pool_other_body_is_synchronous() {
    let mock_server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/backend/api/node-pool/np-1/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "deleted"
        })))
        .mount(&mock_server)
        .await;

    let client = client(&mock_server);
    let handle = client
        .delete_node_pool(&NodePoolId::new("np-1"))
        .await
        .unwrap();
    assert!(handle.is_none());
}

#[tokio::test]
async fn test_delete_cluster_returns_operation() {
    let mock_server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/backend/api/cluster/c-1/"))
        .respond_with(ResponseTemplate::new(202).set_body_json(json!({
            "operation_id": "op-del-1"
        })))
        .mount(&mock_server)
        .await;

    let client = client(&mock_server);
    let handle = ResourceApi::delete_cluster(&client, &ClusterId::new("c-1"))
        .await
        .unwrap();
    assert_eq!(handle.operation_id, OperationId::new("op-del-1"));
}

#[tokio::test]
async fn test_catalogs() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/backend/api/openstack/instances/create_options"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "flavor": [
                {"id": "f-1", "name": "m1.small", "vcpus": 1, "memory_mb": 2048, "memory_gb": 2.0},
                {"id": "f-2", "name": "m1.large", "vcpus": 4, "memory_mb": 8192, "out_of_stock": true}
            ],
            "images": []
        })))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/backend/api/cluster/versions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": "v-1", "version": "1.29", "images": [
                {"name": "Ubuntu 22.04", "image_name": "ubuntu-22.04", "openstack_id": "img-1", "os_distro": "ubuntu"}
            ]}
        ])))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/backend/api/cluster/networking"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": "n-1", "network_name": "calico", "version": "3.27"}
        ])))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/backend/api/cluster/addons"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": "a-1", "name": "ingress-nginx", "releases": [{"id": "r-1", "version": "4.10"}]}
        ])))
        .mount(&mock_server)
        .await;

    let client = client(&mock_server);

    let flavors = client.flavors().await.unwrap();
    assert_eq!(flavors.len(), 2);
    assert!(flavors[1].out_of_stock);

    let versions = client.cluster_versions().await.unwrap();
    assert_eq!(versions[0].images[0].image_name, "ubuntu-22.04");

    let networking = client.networking().await.unwrap();
    assert_eq!(networking[0].name, "calico");

    let addons = client.cluster_addons().await.unwrap();
    assert_eq!(addons[0].releases[0].version, "4.10");
}
