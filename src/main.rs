use record_controller::config::ControllerConfig;
use record_controller::controller::PageLoader;
use record_controller::framework::{InMemoryDataService, RecordError};
use record_controller::lifecycle::{setup_tracing, ControllerSystem};
use record_controller::weather::{fields, numbered_stations, WeatherStation, WeatherStationFields};
use std::sync::Arc;
use tracing::{info, warn, Instrument};

#[tokio::main]
async fn main() -> Result<(), String> {
    setup_tracing();

    let config = match std::env::args().nth(1) {
        Some(path) => ControllerConfig::load(path),
        None => ControllerConfig::from_env(),
    }
    .map_err(|e| e.to_string())?;
    info!(
        page_size = config.paging.page_size,
        block_size = config.paging.block_size,
        "Config loaded"
    );

    let store = Arc::new(InMemoryDataService::with_records(numbered_stations(45)));
    let system = ControllerSystem::<WeatherStation>::start(store, config);
    let client = system.client.clone();

    // Page through the list
    let span = tracing::info_span!("paging");
    async {
        let page = client.load_paging(PageLoader::SortedPage).await?;
        let state = client.page_state().await?;
        info!(
            shown = page.len(),
            pages = state.total_pages,
            window = ?(state.start_page, state.end_page),
            "First page"
        );
        client.move_one_page(1).await?;
        client.sort(fields::NAME).await?;
        let page = client.sort(fields::NAME).await?;
        info!(first = ?page.first().map(|s| s.name.as_str()), "Sorted by name, descending");
        Ok::<_, RecordError>(())
    }
    .instrument(span)
    .await
    .map_err(|e| e.to_string())?;

    // Edit an existing station
    let span = tracing::info_span!("edit");
    async {
        client.load(3, false).await?;
        let edit = client.edit_projection::<WeatherStationFields>().await?;
        edit.set_latitude(123.0);
        let blocked = client.save_edit(&edit).await?;
        warn!(message = %blocked.message, errors = ?edit.messages(), "Save refused");

        edit.set_latitude(57.3);
        edit.set_name("Station Three North");
        let saved = client.save_edit(&edit).await?;
        info!(message = %saved.message, "Save finished");
        Ok::<_, RecordError>(())
    }
    .instrument(span)
    .await
    .map_err(|e| e.to_string())?;

    // Create a new one
    let span = tracing::info_span!("create");
    async {
        client.new_record(None).await?;
        let edit = client.edit_projection::<WeatherStationFields>().await?;
        edit.set_name("Lerwick Observatory");
        edit.set_latitude(60.1);
        edit.set_longitude(-1.2);
        edit.set_elevation(82.0);
        let result = client.save_edit(&edit).await?;
        let record = client.record().await?;
        info!(id = record.id, message = %result.message, "Created station");
        Ok::<_, RecordError>(())
    }
    .instrument(span)
    .await
    .map_err(|e| e.to_string())?;

    drop(client);
    system.shutdown().await.map_err(|e| e.to_string())?;

    info!("Application completed successfully");
    Ok(())
}
