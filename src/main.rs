use std::env;
use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::{
    commons::{
        blob_storage::{BlobStorage, MinioStorage},
        document_store::{DocumentStore, RestDocumentStore},
        session_store::{InMemSessionStore, SessionStore},
    },
    new_bill::new_bill_service::UploadSessions,
    services::metrics_service::MetricsService,
};

mod bills;
mod commons;
mod controllers;
mod models;
mod new_bill;
mod services;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();

    // Initialize tracing with JSON format
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    let host = env::var("HOST").expect("HOST must be set");
    let port = env::var("PORT").expect("PORT must be set");

    // No document store configured means "not yet connected": the bills
    // list stays empty and submissions are refused
    let document_store: Option<Arc<dyn DocumentStore>> = env::var("DOCUMENT_STORE_URL")
        .ok()
        .map(|base_url| {
            let timeout_millis = env::var("DOCUMENT_STORE_TIMEOUT_MILLIS")
                .expect("DOCUMENT_STORE_TIMEOUT_MILLIS must be set")
                .parse::<u64>()
                .unwrap();
            Arc::new(RestDocumentStore::new(base_url, timeout_millis)) as Arc<dyn DocumentStore>
        });
    let document_store = web::Data::new(document_store);

    let blob_storage = MinioStorage::new(
        &env::var("MINIO_ENDPOINT").expect("MINIO_ENDPOINT must be set"),
        &env::var("MINIO_ACCESS_KEY").expect("MINIO_ACCESS_KEY must be set"),
        &env::var("MINIO_SECRET_KEY").expect("MINIO_SECRET_KEY must be set"),
        &env::var("MINIO_BUCKET_NAME").expect("MINIO_BUCKET_NAME must be set"),
    )
    .await
    .expect("Failed to initialize blob storage");
    let blob_storage = web::Data::new(Arc::new(blob_storage) as Arc<dyn BlobStorage>);

    let session_store =
        web::Data::new(Arc::new(InMemSessionStore::default()) as Arc<dyn SessionStore>);
    let upload_sessions = web::Data::new(UploadSessions::default());

    let metrics_service = web::Data::new(MetricsService::new(
        &env::var("STATSD_HOST").expect("STATSD_HOST must be set"),
        env::var("STATSD_PORT")
            .expect("STATSD_PORT must be set")
            .parse::<u16>()
            .unwrap(),
        &env::var("STATSD_PREFIX").expect("STATSD_PREFIX must be set"),
    ));

    HttpServer::new(move || {
        App::new()
            .wrap(Cors::permissive())
            .app_data(document_store.clone())
            .app_data(blob_storage.clone())
            .app_data(session_store.clone())
            .app_data(upload_sessions.clone())
            .app_data(metrics_service.clone())
            .service(
                web::scope("/v1")
                    .service(controllers::session::create_session)
                    .service(bills::bills_controller::list_bills)
                    .service(bills::bills_controller::view_attachment)
                    .service(new_bill::new_bill_controller::attach_file)
                    .service(new_bill::new_bill_controller::submit_bill),
            )
    })
    .bind(format!("{}:{}", host, port))?
    .run()
    .await
}
