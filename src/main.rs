#[cfg(feature = "ssr")]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
    use std::sync::Arc;

    use axum::Router;
    use leptos::leptos_config::Env;
    use leptos::*;
    use leptos_axum::{generate_route_list, LeptosRoutes};
    use recipe_feed::app::backend::BackendClient;
    use recipe_feed::app::*;
    use recipe_feed::config::BackendConfig;
    use recipe_feed::fileserv::file_and_error_handler;
    use tracing_subscriber::EnvFilter;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Setting get_configuration(None) means we'll be using cargo-leptos's env values
    // For deployment these variables are:
    // <https://github.com/leptos-rs/start-axum#executing-a-server-on-a-remote-machine-without-the-toolchain>
    let conf = get_configuration(None).await?;
    let mut leptos_options = conf.leptos_options;
    leptos_options.hash_files = true;
    if leptos_options.env == Env::PROD {
        // in the dockerfile, hash.txt will actually be here and not "./hash.txt'
        leptos_options.hash_file = "/app/target/release/hash.txt".to_string();
    }

    let addr = match std::env::var("PORT") {
        Ok(port) => SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, port.parse()?)),
        _ => leptos_options.site_addr,
    };
    let cloned_leptos_options = leptos_options.clone();
    let routes = generate_route_list(App);

    let backend_config = BackendConfig::load()?;
    tracing::info!(backend = %backend_config.base_url, "using recipe backend");
    let backend = Arc::new(BackendClient::new(&backend_config)?);

    let app = Router::new()
        .leptos_routes_with_context(
            &leptos_options,
            routes,
            move || {
                provide_context(backend.clone());
                provide_context(cloned_leptos_options.clone());
            },
            App,
        )
        .fallback(file_and_error_handler)
        .with_state(leptos_options);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("listening on http://{addr}");
    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}

#[cfg(not(feature = "ssr"))]
pub fn main() {
    // no client-side main function
    // unless we want this to work with e.g., Trunk for a purely client-side app
    // see lib.rs for hydration function instead
}
