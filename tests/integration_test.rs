use record_controller::config::ControllerConfig;
use record_controller::controller::PageLoader;
use record_controller::framework::{ControllerEvent, InMemoryDataService, MessageKind};
use record_controller::lifecycle::ControllerSystem;
use record_controller::weather::{fields, numbered_stations, WeatherStation, WeatherStationFields};
use std::sync::Arc;

fn start(count: i64) -> ControllerSystem<WeatherStation> {
    let store = Arc::new(InMemoryDataService::with_records(numbered_stations(count)));
    ControllerSystem::start(store, ControllerConfig::default())
}

/// Full end-to-end test with the real actor over the in-memory store.
#[tokio::test]
async fn test_full_controller_system_integration() {
    let system = start(45);
    let client = system.client.clone();

    // First page of a 45 record list
    let page = client
        .load_paging(PageLoader::SortedPage)
        .await
        .expect("Failed to load paging");
    assert_eq!(page.len(), 20);
    let state = client.page_state().await.unwrap();
    assert_eq!(state.total_pages, 3);
    assert_eq!((state.start_page, state.end_page), (1, 3));

    // Partial last page
    let last = client.go_to_page(3).await.unwrap();
    assert_eq!(last.iter().map(|s| s.id).collect::<Vec<_>>(), vec![41, 42, 43, 44, 45]);

    // Edit an existing station through a projection
    assert!(client.load(3, false).await.unwrap());
    let edit = client
        .edit_projection::<WeatherStationFields>()
        .await
        .expect("Failed to build projection");
    assert!(edit.set_name("Station Three North"));
    let result = client.save_edit(&edit).await.unwrap();
    assert!(result.ok, "Save failed: {}", result.message);
    assert_eq!(client.record().await.unwrap().name, "Station Three North");

    // The list was invalidated by the save and picks the change up
    let page = client.load_paging(PageLoader::SortedPage).await.unwrap();
    assert_eq!(page[2].name, "Station Three North");

    // Create
    client.new_record(None).await.unwrap();
    let edit = client.edit_projection::<WeatherStationFields>().await.unwrap();
    edit.set_name("Lerwick Observatory");
    edit.set_latitude(60.1);
    edit.set_longitude(-1.2);
    edit.set_elevation(82.0);
    let created = client.save_edit(&edit).await.unwrap();
    assert!(created.ok);
    assert_eq!(created.new_id, 46);
    assert_eq!(client.record().await.unwrap().id, 46);

    // Delete
    let deleted = client.delete().await.unwrap();
    assert!(deleted.ok);
    assert_eq!(client.record().await.unwrap().id, -1);
    client.load_paging(PageLoader::Page).await.unwrap();
    assert_eq!(client.page_state().await.unwrap().record_count, Some(45));

    drop(client);
    system.shutdown().await.expect("Failed to shutdown system");
}

#[tokio::test]
async fn test_invalid_edit_is_refused() {
    let system = start(3);
    let client = system.client.clone();

    client.load(1, false).await.unwrap();
    let edit = client.edit_projection::<WeatherStationFields>().await.unwrap();
    assert!(!edit.set_elevation(20000.0));

    let result = client.save_edit(&edit).await.unwrap();
    assert!(!result.ok);
    assert_eq!(result.kind, MessageKind::Warning);
    assert_eq!(
        edit.messages_for(fields::ELEVATION),
        vec!["Elevation should be in the range -1000 to 10000".to_string()]
    );

    // Nothing was written
    client.load(1, true).await.unwrap();
    assert_eq!(client.record().await.unwrap().elevation, 10.0);

    drop(client);
    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_events_follow_edits() {
    let system = start(3);
    let mut events = system.subscribe();
    let client = system.client.clone();

    client.load(2, false).await.unwrap();
    assert_eq!(events.recv().await.unwrap(), ControllerEvent::RecordChanged);

    client.set_field(fields::NAME, "Renamed").await.unwrap();
    assert_eq!(events.recv().await.unwrap(), ControllerEvent::OnDirty);

    client.set_field(fields::NAME, "Station 0002").await.unwrap();
    assert_eq!(events.recv().await.unwrap(), ControllerEvent::OnClean);

    assert!(client.set_filter("Name", "Station 0002", true).await.unwrap());
    assert_eq!(events.recv().await.unwrap(), ControllerEvent::FilterChanged);

    let page = client.load_paging(PageLoader::Page).await.unwrap();
    assert_eq!(page.len(), 1);
    assert_eq!(events.recv().await.unwrap(), ControllerEvent::PageChanged(1));
    assert_eq!(events.recv().await.unwrap(), ControllerEvent::ListChanged);

    drop(client);
    system.shutdown().await.unwrap();
}

/// Concurrent creates through cloned clients are applied one at a time.
#[tokio::test]
async fn test_concurrent_creates() {
    let system = start(5);

    let mut handles = vec![];
    for i in 0..10 {
        let client = system.client.clone();
        handles.push(tokio::spawn(async move {
            let station = WeatherStation::new(0, &format!("New Station {}", i), 55.0, -3.0, 50.0);
            client.save_record(station).await
        }));
    }

    let mut ids = vec![];
    for handle in handles {
        let result = handle.await.unwrap().expect("Create failed");
        assert!(result.ok);
        ids.push(result.new_id);
    }
    ids.sort_unstable();
    assert_eq!(ids, (6..=15).collect::<Vec<_>>());

    let lookup = system.client.lookup_list(Some("All")).await.unwrap();
    assert_eq!(lookup.len(), 16);

    system.shutdown().await.unwrap();
}
