use waypoint_optimizer::jobs::manager::JobManager;

pub struct AppState {
    pub manager: JobManager,
}
