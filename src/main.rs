mod errors;
mod export;
mod handlers;
mod initialization;
mod logging;
mod manager_db;
mod manager_owm;
mod manager_records;
mod manager_youtube;
mod validation;

use std::sync::Arc;
use actix_web::{web, App, HttpServer};
use tokio::sync::Mutex;
use log::info;
use crate::errors::UnrecoverableError;
use crate::initialization::config;
use crate::manager_db::DB;
use crate::manager_owm::OWM;
use crate::manager_records::RecordManager;
use crate::manager_youtube::YouTube;

struct AppState {
    records: RecordManager,
}

#[actix_web::main]
async fn main() -> Result<(), UnrecoverableError> {
    let config = config()?;

    let db = Arc::new(Mutex::new(DB::new(&config.db.db_path)?));
    let owm = OWM::new(&config.openweather)?;
    let youtube = YouTube::new(&config.youtube)?;

    let state = web::Data::new(AppState {
        records: RecordManager::new(db, owm, youtube),
    });

    info!("starting server on {}:{}", config.web_server.bind_address, config.web_server.bind_port);

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .configure(handlers::routes)
    })
        .bind((config.web_server.bind_address, config.web_server.bind_port))?
        .run()
        .await?;

    Ok(())
}
