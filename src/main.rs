use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, bail};
use applique_core::bootstrap::{AppBuilder, resolve_config_path};
use applique_core::ingest::load_pages;
use applique_core::retriever::CollectionStatus;
use applique_core::{KnownComponents, QueryAnswer};
use applique_gateway::{GatewayServer, PipelineService};
use clap::{Parser, Subcommand};
use tokio::sync::watch;

#[derive(Parser)]
#[command(name = "applique")]
#[command(about = "Answer questions about Appliqué components from their indexed docs", long_about = None)]
#[command(version)]
struct Cli {
    /// Config file (falls back to APPLIQUE_CONFIG, then config/default.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Answer a single question and exit
    Query {
        /// The question, e.g. "How do I put an icon inside a button?"
        query: String,

        /// Print routing and retrieval details as JSON
        #[arg(long)]
        json: bool,
    },

    /// Index scraped component pages into per-component collections
    Ingest {
        /// JSON Lines file of scraped pages
        pages: PathBuf,
    },

    /// Serve POST /query over HTTP
    Serve {
        #[arg(long)]
        bind: Option<String>,

        #[arg(long)]
        port: Option<u16>,
    },

    /// List the components the router can choose from
    Components,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_subscriber(&resolve_config_path(cli.config.as_deref()));

    let app = AppBuilder::from_env(cli.config.as_deref()).await?;
    tracing::debug!(path = %app.config_path().display(), "config loaded");

    match cli.command {
        Command::Query { query, json } => run_query(&app, &query, json).await,
        Command::Ingest { pages } => run_ingest(&app, &pages).await,
        Command::Serve { bind, port } => run_serve(&app, bind, port).await,
        Command::Components => {
            let known = KnownComponents::load(&app.components_path()).await?;
            for (name, collection) in known.iter().zip(known.collections()) {
                println!("{name}\t{collection}");
            }
            Ok(())
        }
    }
}

async fn run_query(app: &AppBuilder, query: &str, json: bool) -> anyhow::Result<()> {
    let known = KnownComponents::load(&app.components_path()).await?;
    let pipeline = app.build_pipeline()?;
    let answer = pipeline.process_query(query, &known).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&answer_report(&answer))?);
    } else {
        println!("{}", answer.text);
    }
    Ok(())
}

fn answer_report(answer: &QueryAnswer) -> serde_json::Value {
    let collections: Vec<serde_json::Value> = answer
        .retrieval
        .collections
        .iter()
        .map(|report| {
            let (status, detail) = match &report.status {
                CollectionStatus::Hits(n) => ("hits", serde_json::json!(n)),
                CollectionStatus::Missing => ("missing", serde_json::Value::Null),
                CollectionStatus::Failed(e) => ("failed", serde_json::json!(e)),
            };
            serde_json::json!({
                "collection": report.collection.as_str(),
                "status": status,
                "detail": detail,
            })
        })
        .collect();

    serde_json::json!({
        "response": answer.text,
        "routing": {
            "source": format!("{:?}", answer.routing.source()).to_lowercase(),
            "collections": answer
                .routing
                .collections()
                .iter()
                .map(|c| c.as_str())
                .collect::<Vec<_>>(),
        },
        "retrieval": collections,
        "found_context": answer.found_context(),
    })
}

async fn run_ingest(app: &AppBuilder, pages_path: &Path) -> anyhow::Result<()> {
    let pages = load_pages(pages_path)
        .await
        .with_context(|| format!("reading scraped pages from {}", pages_path.display()))?;
    tracing::info!(pages = pages.len(), "loaded scraped pages");

    let ingestor = app.build_ingestor()?;
    let report = ingestor.ingest(pages).await;

    for (component, reason) in &report.failed {
        tracing::warn!(%component, %reason, "component not indexed");
    }

    let known = report.known_components();
    if known.is_empty() {
        bail!("no component was indexed; known components left unchanged");
    }
    let components_path = app.components_path();
    known.save(&components_path).await?;

    println!(
        "indexed {} components ({} chunks), {} failed, {} pages skipped; names written to {}",
        report.ingested.len(),
        report.total_chunks(),
        report.failed.len(),
        report.skipped_pages,
        components_path.display()
    );
    Ok(())
}

async fn run_serve(
    app: &AppBuilder,
    bind: Option<String>,
    port: Option<u16>,
) -> anyhow::Result<()> {
    let gateway = &app.config().gateway;
    let bind = bind.unwrap_or_else(|| gateway.bind.clone());
    let port = port.unwrap_or(gateway.port);

    let pipeline = Arc::new(app.build_pipeline()?);
    let service = Arc::new(PipelineService::new(pipeline, app.components_path()));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to listen for ctrl-c: {e:#}");
            return;
        }
        tracing::info!("received shutdown signal");
        let _ = shutdown_tx.send(true);
    });

    let server = GatewayServer::new(&bind, port, service, shutdown_rx)?
        .with_auth(gateway.auth_token.clone())
        .with_rate_limit(gateway.rate_limit)
        .with_max_body_size(gateway.max_body_size);
    server.serve().await?;
    Ok(())
}

fn init_subscriber(config_path: &Path) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let fmt_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    #[cfg(feature = "otel")]
    {
        let config = applique_core::config::Config::load(config_path).ok();
        let use_otlp = config
            .as_ref()
            .is_some_and(|c| c.observability.exporter == "otlp");

        if use_otlp {
            let endpoint = config
                .as_ref()
                .map_or("http://localhost:4317", |c| &c.observability.endpoint);

            match setup_otel_tracer(endpoint) {
                Ok(tracer) => {
                    let otel_layer = tracing_opentelemetry::layer().with_tracer(tracer);
                    tracing_subscriber::registry()
                        .with(filter)
                        .with(fmt_layer)
                        .with(otel_layer)
                        .init();
                    return;
                }
                Err(e) => {
                    eprintln!("OTel initialization failed, falling back to fmt: {e}");
                }
            }
        }
    }

    #[cfg(not(feature = "otel"))]
    let _ = config_path;

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();
}

#[cfg(feature = "otel")]
fn setup_otel_tracer(endpoint: &str) -> anyhow::Result<opentelemetry_sdk::trace::SdkTracer> {
    use opentelemetry::trace::TracerProvider;
    use opentelemetry_otlp::WithExportConfig;

    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(endpoint)
        .build()?;

    let provider = opentelemetry_sdk::trace::SdkTracerProvider::builder()
        .with_batch_exporter(exporter)
        .build();

    let tracer = provider.tracer("applique");
    opentelemetry::global::set_tracer_provider(provider);

    Ok(tracer)
}
