use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use serde_json::Value;

use geovision_config::Profile;
use geovision_functions::{app, handle_notify};

#[tokio::main]
async fn main() -> Result<(), Error> {
    let config = app::bootstrap(Profile::Notifier)?;
    let sdk = app::sdk_config(&config).await;
    let notifier = app::upload_notifier(&config, &sdk)?;
    let notifier = &notifier;

    run(service_fn(move |event: LambdaEvent<Value>| async move {
        Ok::<Value, Error>(handle_notify(notifier, &event.payload).await)
    }))
    .await
}
