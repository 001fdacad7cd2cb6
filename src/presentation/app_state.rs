// Application state for HTTP handlers
use crate::application::anomaly_service::AnomalyService;
use crate::application::dispatch_service::DispatchService;

#[derive(Clone)]
pub struct AppState {
    pub dispatch_service: DispatchService,
    pub anomaly_service: AnomalyService,
}
