use std::process;

use log::{error, info};
use tokio::net::TcpListener;

use lightd::config::Config;
use lightd::devices::Light;
use lightd::errors::Error;
use lightd::hardware::OutputRegister;
use lightd::server;

#[tokio::main]
async fn main() {
    env_logger::init();

    let config = Config::load();

    // No working register, no daemon: abort before binding the listener.
    let register = match build_register(&config) {
        Ok(register) => register,
        Err(err) => {
            error!("cannot initialize output register: {err}");
            process::exit(1);
        }
    };

    let light = Light::new(register);
    let app = server::router(light);

    let listener = match TcpListener::bind(("0.0.0.0", config.port)).await {
        Ok(listener) => listener,
        Err(err) => {
            error!("cannot bind port {}: {err}", config.port);
            process::exit(1);
        }
    };

    info!("listening on {}", config.port);
    if let Err(err) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("server error: {err}");
        process::exit(1);
    }
    info!("exiting");
}

#[cfg(feature = "pi")]
fn build_register(config: &Config) -> Result<Box<dyn OutputRegister>, Error> {
    info!("driving GPIO pin {}", config.pin);
    Ok(Box::new(lightd::hardware::GpioRegister::new(config.pin)?))
}

#[cfg(not(feature = "pi"))]
fn build_register(config: &Config) -> Result<Box<dyn OutputRegister>, Error> {
    info!(
        "compiled without GPIO support; writes to pin {} are dropped",
        config.pin
    );
    Ok(Box::new(lightd::hardware::NullRegister))
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("received termination signal"),
        Err(err) => error!("cannot listen for termination signal: {err}"),
    }
}
