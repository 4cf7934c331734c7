use record_controller::config::ControllerConfig;
use record_controller::controller::PageLoader;
use record_controller::framework::{
    ControllerActor, MessageKind, MockDataService, RecordError, TaskResult,
};
use record_controller::weather::{fields, numbered_stations, WeatherStation, WeatherStationFields};
use std::sync::Arc;

/// Real controller actor over a scripted data service.
fn spawn_with_mock() -> (
    Arc<MockDataService<WeatherStation>>,
    record_controller::framework::ControllerClient<WeatherStation>,
    tokio::task::JoinHandle<()>,
) {
    let mock = Arc::new(MockDataService::new());
    let (actor, client) = ControllerActor::new(mock.clone(), ControllerConfig::default());
    let handle = tokio::spawn(actor.run());
    (mock, client, handle)
}

#[tokio::test]
async fn test_repeated_load_fetches_once() {
    let (mock, client, handle) = spawn_with_mock();
    mock.expect_get_record(5)
        .return_ok(Some(WeatherStation::new(5, "Tiree Airport", 56.5, -6.9, 9.0)));

    assert!(client.load(5, false).await.unwrap());
    assert!(!client.load(5, false).await.unwrap());
    assert_eq!(client.record().await.unwrap().name, "Tiree Airport");

    mock.verify();
    drop(client);
    handle.await.unwrap();
}

#[tokio::test]
async fn test_failed_update_keeps_state() {
    let (mock, client, handle) = spawn_with_mock();
    mock.expect_get_record(5)
        .return_ok(Some(WeatherStation::new(5, "Tiree Airport", 56.5, -6.9, 9.0)));
    mock.expect_update()
        .return_ok(TaskResult::failure("Record locked", MessageKind::Danger));

    client.load(5, false).await.unwrap();
    client.set_field(fields::NAME, "Tiree Airfield").await.unwrap();
    let result = client.save().await.unwrap();

    assert!(!result.ok);
    assert_eq!(result.message, "Record locked");
    assert_eq!(client.record().await.unwrap().name, "Tiree Airport");
    let values = client.values().await.unwrap();
    assert!(values.is_dirty());
    assert_eq!(values.get_edited::<String>(fields::NAME), "Tiree Airfield");

    let written = mock.written_records();
    assert_eq!(written[0].name, "Tiree Airfield");
    mock.verify();
    drop(client);
    handle.await.unwrap();
}

#[tokio::test]
async fn test_invalid_projection_never_reaches_store() {
    let (mock, client, handle) = spawn_with_mock();
    client.new_record(None).await.unwrap();

    let edit = client.edit_projection::<WeatherStationFields>().await.unwrap();
    edit.set_name("Oban");
    let result = client.save_edit(&edit).await.unwrap();

    assert!(!result.ok);
    assert!(mock.written_records().is_empty());
    mock.verify();
    drop(client);
    handle.await.unwrap();
}

#[tokio::test]
async fn test_first_filter_goes_to_store() {
    let (mock, client, handle) = spawn_with_mock();
    mock.expect_get_filtered_list().return_ok(numbered_stations(10));

    client.set_filter("Latitude", 52.0, true).await.unwrap();
    client.set_filter("Name", "Station 0004", true).await.unwrap();
    let page = client.load_paging(PageLoader::SortedPage).await.unwrap();

    assert_eq!(page.len(), 1);
    assert_eq!(page[0].id, 4);
    let received = mock.received_filters();
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].len(), 1);
    assert!(received[0].try_get_filter("Latitude").is_some());
    mock.verify();
    drop(client);
    handle.await.unwrap();
}

#[tokio::test]
async fn test_unknown_sort_column_is_an_error() {
    let (mock, client, handle) = spawn_with_mock();
    mock.expect_get_filtered_list().return_ok(numbered_stations(3));
    client.load_paging(PageLoader::SortedPage).await.unwrap();

    let result = client.sort("Altitude").await;
    assert!(matches!(result, Err(RecordError::UnknownColumn(c)) if c == "Altitude"));

    // The actor keeps serving after a failed request
    let page = client.sort("elevation").await.unwrap();
    assert_eq!(page.len(), 3);
    mock.verify();
    drop(client);
    handle.await.unwrap();
}

#[tokio::test]
async fn test_closed_actor_reports_closed() {
    let (_mock, client, handle) = spawn_with_mock();
    handle.abort();
    let _ = handle.await;
    let result = client.load(1, false).await;
    assert!(matches!(result, Err(RecordError::ActorClosed)));
}
