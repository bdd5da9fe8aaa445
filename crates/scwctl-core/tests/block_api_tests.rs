//! Integration tests for the block storage API against the mock server

use scwctl_core::api::block::{
    BlockApi, CreateVolumeRequest, ListVolumesRequest, VolumeSource, VolumeStatus,
    WaitForVolumeRequest,
};
use scwctl_core::testing::{MockScwServer, SnapshotFixture, TEST_PROJECT_ID, VolumeFixture};
use serde_json::json;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

#[tokio::test]
async fn test_list_volumes_uses_default_zone() {
    let server = MockScwServer::start().await;
    server
        .mock_volumes_list(
            "fr-par-1",
            vec![
                VolumeFixture::new("v1", "data").build(),
                VolumeFixture::new("v2", "logs").status("in_use").build(),
            ],
        )
        .await;

    let api = BlockApi::new(server.client());
    let list = api.list_volumes(&ListVolumesRequest::default()).await.unwrap();

    assert_eq!(list.total_count, 2);
    assert_eq!(list.volumes[0].name, "data");
    assert_eq!(list.volumes[1].status, VolumeStatus::InUse);
}

#[tokio::test]
async fn test_list_all_volumes_walks_pages() {
    let server = MockScwServer::start().await;
    let zone = "nl-ams-1";
    let url = format!("/block/v1alpha1/zones/{zone}/volumes");

    Mock::given(method("GET"))
        .and(path(url.clone()))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "volumes": [
                VolumeFixture::new("v1", "a").zone(zone).build(),
                VolumeFixture::new("v2", "b").zone(zone).build(),
            ],
            "total_count": 3
        })))
        .expect(1)
        .mount(server.inner())
        .await;
    Mock::given(method("GET"))
        .and(path(url))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "volumes": [VolumeFixture::new("v3", "c").zone(zone).build()],
            "total_count": 3
        })))
        .expect(1)
        .mount(server.inner())
        .await;

    let api = BlockApi::new(server.client());
    let all = api
        .list_all_volumes(&ListVolumesRequest {
            zone: Some(zone.parse().unwrap()),
            ..Default::default()
        })
        .await
        .unwrap();

    let ids: Vec<_> = all.volumes.iter().map(|v| v.id.as_str()).collect();
    assert_eq!(ids, vec!["v1", "v2", "v3"]);
}

#[tokio::test]
async fn test_create_volume_fills_default_project() {
    let server = MockScwServer::start().await;
    Mock::given(method("POST"))
        .and(path("/block/v1alpha1/zones/fr-par-1/volumes"))
        .and(body_json(json!({
            "name": "data",
            "project_id": TEST_PROJECT_ID,
            "from_empty": {"size": 20_000_000_000u64}
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(VolumeFixture::new("v1", "data").status("creating").build()),
        )
        .expect(1)
        .mount(server.inner())
        .await;

    let api = BlockApi::new(server.client());
    let volume = api
        .create_volume(&CreateVolumeRequest {
            zone: None,
            name: "data".to_string(),
            perf_iops: None,
            project_id: None,
            source: VolumeSource::Empty {
                size: 20_000_000_000,
            },
            tags: vec![],
        })
        .await
        .unwrap();
    assert_eq!(volume.status, VolumeStatus::Creating);
}

#[tokio::test]
async fn test_get_volume_not_found() {
    let server = MockScwServer::start().await;
    server
        .mock_error(
            "GET",
            "/block/v1alpha1/zones/fr-par-1/volumes/missing",
            404,
            "resource is not found",
        )
        .await;

    let api = BlockApi::new(server.client());
    let err = api.get_volume(None, "missing").await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_wait_for_volume_polls_until_available() {
    let server = MockScwServer::start().await;
    let url = "/block/v1alpha1/zones/fr-par-1/volumes/v1";

    Mock::given(method("GET"))
        .and(path(url))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(VolumeFixture::new("v1", "data").status("creating").build()),
        )
        .up_to_n_times(2)
        .with_priority(1)
        .mount(server.inner())
        .await;
    server
        .mock_volume_get("fr-par-1", "v1", VolumeFixture::new("v1", "data").build())
        .await;

    let api = BlockApi::new(server.client());
    let volume = api
        .wait_for_volume(
            &WaitForVolumeRequest {
                volume_id: "v1".to_string(),
                ..Default::default()
            },
            None,
        )
        .await
        .unwrap();
    assert_eq!(volume.status, VolumeStatus::Available);
}

#[tokio::test]
async fn test_wait_for_volume_stops_on_error_status() {
    let server = MockScwServer::start().await;
    server
        .mock_volume_get(
            "fr-par-1",
            "v1",
            VolumeFixture::new("v1", "data").status("error").build(),
        )
        .await;

    let api = BlockApi::new(server.client());
    let volume = api
        .wait_for_volume(
            &WaitForVolumeRequest {
                volume_id: "v1".to_string(),
                terminal_status: Some(VolumeStatus::Available),
                ..Default::default()
            },
            None,
        )
        .await
        .unwrap();
    assert_eq!(volume.status, VolumeStatus::Error);
}

#[tokio::test]
async fn test_wait_for_volume_gives_up() {
    let server = MockScwServer::start().await;
    server
        .mock_volume_get(
            "fr-par-1",
            "v1",
            VolumeFixture::new("v1", "data").status("resizing").build(),
        )
        .await;

    let api = BlockApi::new(server.client());
    let err = api
        .wait_for_volume(
            &WaitForVolumeRequest {
                volume_id: "v1".to_string(),
                options: Some(scwctl_core::WaitOptions::new(
                    std::time::Duration::from_millis(1),
                    2,
                )),
                ..Default::default()
            },
            None,
        )
        .await
        .unwrap_err();
    assert!(err.is_timeout());
    assert_eq!(
        err.to_string(),
        "max retries exceeded waiting for block volume v1 after 3 attempts"
    );
}

#[tokio::test]
async fn test_snapshot_get_and_delete() {
    let server = MockScwServer::start().await;
    server
        .mock_snapshot_get(
            "fr-par-2",
            "s1",
            SnapshotFixture::new("s1", "nightly").zone("fr-par-2").build(),
        )
        .await;
    server.mock_snapshot_delete("fr-par-2", "s1").await;

    let api = BlockApi::new(server.client());
    let zone = "fr-par-2".parse().unwrap();
    let snapshot = api.get_snapshot(Some(&zone), "s1").await.unwrap();
    assert_eq!(snapshot.name, "nightly");
    api.delete_snapshot(Some(&zone), "s1").await.unwrap();
}
