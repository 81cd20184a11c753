use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use serde_json::Value;

use geovision_config::Profile;
use geovision_functions::{app, handle_caption};

#[tokio::main]
async fn main() -> Result<(), Error> {
    let config = app::bootstrap(Profile::Caption)?;
    let sdk = app::sdk_config(&config).await;
    let orchestrator = app::caption_orchestrator(&config, &sdk);
    let orchestrator = &orchestrator;

    run(service_fn(move |event: LambdaEvent<Value>| async move {
        Ok::<Value, Error>(handle_caption(orchestrator, &event.payload).await)
    }))
    .await
}
