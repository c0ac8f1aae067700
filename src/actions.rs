use crate::backend::Backend;
use crate::chart::ChartManager;
use crate::models::{
    PredictionReply, RegistrationPayload, RegistrationReceipt, UploadForm, WeeklySeries,
};
use crate::page::{Region, RenderInstruction, Surface};
use crate::render;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

/// Sends the registration form and writes the outcome to the status line.
pub async fn submit_registration<B, S>(backend: &B, payload: RegistrationPayload, surface: &mut S)
where
    B: Backend,
    S: Surface + Send,
{
    let text = match backend.register(&payload).await {
        Ok(reply) if !reply.is_ok() => {
            error!(status = reply.status, body = %reply.body, "register failed");
            render::registration_failure(&reply)
        }
        Ok(reply) => match RegistrationReceipt::decode(&reply.body) {
            Ok(receipt) => {
                info!(status = reply.status, "registration saved");
                render::registration_saved(&receipt)
            }
            Err(err) => {
                error!(status = reply.status, body = %reply.body, "register error: {err}");
                render::registration_unreachable()
            }
        },
        Err(err) => {
            error!("register error: {err}");
            render::registration_unreachable()
        }
    };
    surface.text(Region::RegisterStatus, text);
}

/// Uploads an image for prediction. The placeholder goes out before the
/// request; the weekly chart is reloaded after a rendered prediction.
pub async fn submit_upload<B, S>(
    backend: &B,
    chart: &Mutex<ChartManager>,
    form: UploadForm,
    surface: &mut S,
) where
    B: Backend,
    S: Surface + Send,
{
    surface.html(Region::Result, render::ANALYZING.to_string());

    let reply = match backend.upload(form).await {
        Ok(reply) => reply,
        Err(err) => {
            error!("upload failed: {err}");
            surface.html(Region::Result, render::upload_unreachable());
            return;
        }
    };

    if !reply.is_ok() {
        error!(status = reply.status, body = %reply.body, "upload error");
        let message = reply.failure_message(&["error", "message"]);
        surface.html(Region::Result, render::upload_error(&message));
        return;
    }

    let html = match PredictionReply::decode(&reply.body) {
        Ok(PredictionReply::Rejected { error }) => {
            warn!(%error, "prediction rejected");
            surface.html(Region::Result, render::upload_error(&error));
            return;
        }
        Ok(PredictionReply::MultiType(result)) => {
            info!(food = %result.food, types = result.types.len(), "logged multi-type prediction");
            render::multi_type_food(&result)
        }
        Ok(PredictionReply::Single(result)) => {
            info!(food = %result.food, "logged prediction");
            render::single_food(&result)
        }
        Err(err) => {
            error!("upload failed: unexpected prediction body: {err}");
            surface.html(Region::Result, render::upload_unreachable());
            return;
        }
    };
    surface.html(Region::Result, html);

    load_chart(backend, chart, surface).await;
}

/// Fetches weekly totals and redraws the chart. Failures are logged only.
pub async fn load_chart<B, S>(backend: &B, chart: &Mutex<ChartManager>, surface: &mut S)
where
    B: Backend,
    S: Surface + Send,
{
    let reply = match backend.weekly_data().await {
        Ok(reply) => reply,
        Err(err) => {
            error!("error loading chart: {err}");
            return;
        }
    };
    if !reply.is_ok() {
        warn!(status = reply.status, "no weekly data or server returned error");
    }

    let series = WeeklySeries::from_body(&reply.body);
    let snapshot = chart.lock().await.render(&series);
    surface.apply(RenderInstruction::Chart {
        target: Region::CalorieChart,
        chart: snapshot,
    });
}
