use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use serde_json::Value;

use geovision_config::Profile;
use geovision_events::ApiResponse;
use geovision_functions::{app, handle_analyze};

#[tokio::main]
async fn main() -> Result<(), Error> {
    let config = app::bootstrap(Profile::Analyzer)?;
    let sdk = app::sdk_config(&config).await;
    let analyzer = app::room_analyzer(&config, &sdk);
    let analyzer = &analyzer;

    run(service_fn(move |event: LambdaEvent<Value>| async move {
        Ok::<ApiResponse, Error>(handle_analyze(analyzer, &event.payload).await)
    }))
    .await
}
