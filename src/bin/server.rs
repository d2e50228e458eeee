use std::{
    net::{IpAddr, SocketAddr},
    process::exit,
};

use axum::{
    Router,
    extract::{MatchedPath, Request},
    middleware,
};
use axum_server::Handle;
use clap::Parser;
use rusqlite::Connection;
use tower_http::trace::TraceLayer;

#[cfg(debug_assertions)]
use tower_livereload::LiveReloadLayer;

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use finance_reports::{
    AppState, DEFAULT_EVENT_CAPACITY, ReportEvents, build_router, graceful_shutdown,
    logging_middleware, money::Currency, spawn_event_logger,
};

/// The web server for viewing financial reports.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the application SQLite database.
    #[arg(long)]
    db_path: String,

    /// The port to serve the app from.
    #[arg(short, long, default_value_t = 3000)]
    port: u16,

    /// The IP address to listen on.
    #[arg(short, long, default_value = "127.0.0.1")]
    address: IpAddr,

    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    #[arg(long, env = "TIMEZONE", default_value = "Etc/UTC")]
    timezone: String,

    /// The currency of reports for periods without any transactions, unless
    /// the cashflow accounts have their own.
    #[arg(long, default_value = "USD")]
    currency: String,

    /// The number of report events buffered for slow subscribers.
    #[arg(long, default_value_t = DEFAULT_EVENT_CAPACITY)]
    event_capacity: usize,

    /// Log the headers and bodies of every request and response.
    #[arg(long)]
    log_requests: bool,
}

#[tokio::main]
async fn main() {
    setup_logging();

    let args = Args::parse();

    if time_tz::timezones::get_by_name(&args.timezone).is_none() {
        tracing::error!(
            "\"{}\" is not a valid timezone, use a canonical timezone name such as \"Pacific/Auckland\"",
            args.timezone
        );
        exit(1);
    }

    let default_currency = match Currency::new(&args.currency) {
        Ok(currency) => currency,
        Err(error) => {
            tracing::error!("invalid default currency: {error}");
            exit(1);
        }
    };

    let connection = match Connection::open(&args.db_path) {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not open the database at {}: {error}", args.db_path);
            exit(1);
        }
    };

    let events = ReportEvents::new(args.event_capacity);
    let _event_logger = spawn_event_logger(&events);

    let state = match AppState::new(connection, &args.timezone, default_currency, events) {
        Ok(state) => state,
        Err(error) => {
            tracing::error!("could not initialize the database: {error}");
            exit(1);
        }
    };

    let handle = Handle::new();
    tokio::spawn(graceful_shutdown(handle.clone()));

    let router = build_router(state);

    let router = if args.log_requests {
        router.layer(middleware::from_fn(logging_middleware))
    } else {
        router
    };

    let router = add_tracing_layer(router);

    #[cfg(debug_assertions)]
    let router = router.layer(LiveReloadLayer::new());

    let addr = SocketAddr::new(args.address, args.port);
    tracing::info!("HTTP server listening on http://{}", addr);

    if let Err(error) = axum_server::bind(addr)
        .handle(handle)
        .serve(router.into_make_service())
        .await
    {
        tracing::error!("server error: {error}");
        exit(1);
    }
}

fn setup_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().pretty())
        .init();
}

fn add_tracing_layer(router: Router) -> Router {
    let tracing_layer = TraceLayer::new_for_http()
        .make_span_with(|req: &Request| {
            let method = req.method();
            let uri = req.uri();

            let matched_path = req
                .extensions()
                .get::<MatchedPath>()
                .map(|matched_path| matched_path.as_str());

            tracing::debug_span!("request", %method, %uri, matched_path)
        })
        // By default, `TraceLayer` will log 5xx responses but we're doing our specific
        // logging of errors so disable that
        .on_failure(());

    router.layer(tracing_layer)
}
