//! Toolkit-independent forecast view model.
//!
//! Owns everything the presentation layer renders. Queries are dispatched to
//! the forecast service; results come back over a channel and are applied
//! by `poll()` on the presentation thread.

use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::time::{Duration, Instant};

use clima_core::{AppError, FetchState};
use clima_weather::{DayGroup, ForecastQuery, ForecastReport, HourlyRow};

use crate::app_services::AppServices;
use crate::services::{request_forecast_fetch, ForecastServiceError, ForecastServiceMessage};

pub struct ForecastModel {
    services: Arc<AppServices>,
    tx: Sender<ForecastServiceMessage>,
    rx: Receiver<ForecastServiceMessage>,
    state: FetchState,
    next_request_id: u64,
    report: Option<ForecastReport>,
    error_message: String,
    error_hint: String,
    selected_day: usize,
}

impl ForecastModel {
    pub fn new(services: Arc<AppServices>) -> Self {
        let (tx, rx) = std::sync::mpsc::channel();
        Self {
            services,
            tx,
            rx,
            state: FetchState::Idle,
            next_request_id: 0,
            report: None,
            error_message: String::new(),
            error_hint: String::new(),
            selected_day: 0,
        }
    }

    /// Search by place name typed by the user.
    /// Returns false if the text was rejected without a request.
    pub fn search(&mut self, text: &str) -> bool {
        match ForecastQuery::place(text) {
            Ok(query) => {
                self.dispatch(query);
                true
            }
            Err(e) => {
                self.reject(ForecastServiceError::InvalidQuery(e));
                false
            }
        }
    }

    /// Search by a point clicked on the map.
    pub fn select_point(&mut self, latitude: f64, longitude: f64) -> bool {
        match ForecastQuery::coordinates(latitude, longitude) {
            Ok(query) => {
                self.dispatch(query);
                true
            }
            Err(e) => {
                self.reject(ForecastServiceError::InvalidQuery(e));
                false
            }
        }
    }

    /// Drop the pending fetch and the shown report, then show `e`.
    fn reject(&mut self, e: ForecastServiceError) {
        self.state = FetchState::Idle;
        self.report = None;
        self.selected_day = 0;
        self.set_error(e);
    }

    fn dispatch(&mut self, query: ForecastQuery) {
        self.next_request_id += 1;
        let request_id = self.next_request_id;

        self.state = self.state.start(request_id);
        self.error_message.clear();
        self.error_hint.clear();

        request_forecast_fetch(&self.tx, &self.services, request_id, query);
    }

    /// Apply any completed fetches. Returns true if visible state changed.
    pub fn poll(&mut self) -> bool {
        let mut changed = false;
        while let Ok(msg) = self.rx.try_recv() {
            changed |= self.apply(msg);
        }
        changed
    }

    /// Block until the pending fetch completes or `timeout` elapses.
    /// Returns false on timeout.
    pub fn wait(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        while self.state.is_loading() {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.rx.recv_timeout(remaining) {
                Ok(msg) => {
                    self.apply(msg);
                }
                Err(RecvTimeoutError::Timeout) => return false,
                // We hold a sender ourselves, so this cannot happen
                Err(RecvTimeoutError::Disconnected) => return false,
            }
        }
        true
    }

    fn apply(&mut self, msg: ForecastServiceMessage) -> bool {
        match msg {
            ForecastServiceMessage::FetchDone { request_id, result } => {
                if !self.state.accepts(request_id) {
                    tracing::debug!("Discarding stale forecast #{}", request_id);
                    return false;
                }
                self.state = self.state.on_fetch_done(request_id);

                match result {
                    Ok(report) => {
                        tracing::info!(
                            "Forecast #{} ready: {} days for {}",
                            request_id,
                            report.days.len(),
                            report.display_name()
                        );
                        self.report = Some(report);
                        self.selected_day = 0;
                        self.error_message.clear();
                        self.error_hint.clear();
                    }
                    Err(e) => {
                        // A failed query must not leave the previous place on screen
                        self.report = None;
                        self.set_error(e);
                    }
                }
                true
            }
        }
    }

    fn set_error(&mut self, e: ForecastServiceError) {
        self.error_message = e.to_string();
        self.error_hint = AppError::from(e).user_message().to_string();
    }

    pub fn is_loading(&self) -> bool {
        self.state.is_loading()
    }

    pub fn has_data(&self) -> bool {
        self.report.is_some()
    }

    /// Message of the last error, verbatim
    pub fn error_message(&self) -> &str {
        &self.error_message
    }

    /// Short actionable text to show next to the error
    pub fn error_hint(&self) -> &str {
        &self.error_hint
    }

    pub fn report(&self) -> Option<&ForecastReport> {
        self.report.as_ref()
    }

    pub fn location_name(&self) -> String {
        self.report
            .as_ref()
            .map(ForecastReport::display_name)
            .unwrap_or_default()
    }

    pub fn day_count(&self) -> usize {
        self.report.as_ref().map(|r| r.days.len()).unwrap_or(0)
    }

    pub fn day(&self, index: usize) -> Option<&DayGroup> {
        self.report.as_ref().and_then(|r| r.days.get(index))
    }

    /// Select the day shown in the hourly detail view.
    pub fn select_day(&mut self, index: usize) -> bool {
        if index < self.day_count() {
            self.selected_day = index;
            true
        } else {
            false
        }
    }

    pub fn selected_day(&self) -> usize {
        self.selected_day
    }

    /// Hourly rows for the selected day
    pub fn hourly(&self) -> Vec<HourlyRow> {
        self.report
            .as_ref()
            .map(|r| r.hourly(self.selected_day))
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clima_weather::{ForecastClient, ForecastClientConfig, GroupingZone};
    use wiremock::matchers::{method, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    // 2024-06-01T00:00:00Z
    const JUNE_1: i64 = 1_717_200_000;

    fn body(city: &str, entries: i64) -> serde_json::Value {
        let list: Vec<serde_json::Value> = (0..entries)
            .map(|i| {
                serde_json::json!({
                    "dt": JUNE_1 + i * 3 * 3600,
                    "main": {"temp": 15.0 + i as f64, "feels_like": 14.0, "humidity": 60},
                    "weather": [{"description": "nubes", "icon": "04d"}],
                    "wind": {"speed": 2.5}
                })
            })
            .collect();
        serde_json::json!({"list": list, "city": {"name": city}})
    }

    fn model_for(server: &MockServer) -> ForecastModel {
        let services = AppServices::with_handle(tokio::runtime::Handle::current());
        let config = ForecastClientConfig::new("k").with_base_url(format!("{}/forecast", server.uri()));
        services.set_forecast_client(ForecastClient::new(config).unwrap());
        services.set_grouping_zone(GroupingZone::Named(chrono_tz::Tz::UTC));
        ForecastModel::new(services)
    }

    /// Poll until the model is idle, yielding to the runtime between polls.
    async fn settle(model: &mut ForecastModel) {
        for _ in 0..500 {
            model.poll();
            if !model.is_loading() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }

    #[tokio::test]
    async fn search_populates_days_and_hourly() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("q", "Quito"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body("Quito", 16)))
            .mount(&server)
            .await;

        let mut model = model_for(&server);
        assert!(model.search("Quito"));
        assert!(model.is_loading());

        settle(&mut model).await;

        assert!(model.has_data());
        assert_eq!(model.location_name(), "Quito");
        assert_eq!(model.day_count(), 2);
        assert_eq!(model.day(0).unwrap().entries.len(), 8);
        assert!(model.error_message().is_empty());

        assert!(model.select_day(1));
        let hourly = model.hourly();
        assert_eq!(hourly.len(), 8);
        assert_eq!(hourly[0].time, "00:00");
        assert!(!model.select_day(2));
    }

    #[tokio::test]
    async fn blank_search_is_rejected_without_request() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body("X", 1)))
            .expect(0)
            .mount(&server)
            .await;

        let mut model = model_for(&server);
        assert!(!model.search("   "));
        assert!(!model.is_loading());
        assert_eq!(model.error_message(), "Place name is empty");
        assert!(!model.error_hint().is_empty());
    }

    #[tokio::test]
    async fn out_of_range_point_is_rejected() {
        let server = MockServer::start().await;
        let mut model = model_for(&server);
        assert!(!model.select_point(120.0, 0.0));
        assert!(model.error_message().contains("Latitude"));
    }

    #[tokio::test]
    async fn not_found_surfaces_message_and_clears_report() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("q", "Quito"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body("Quito", 3)))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(query_param("q", "Atlantis"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let mut model = model_for(&server);
        model.search("Quito");
        settle(&mut model).await;
        assert!(model.has_data());

        model.search("Atlantis");
        settle(&mut model).await;

        assert!(!model.has_data());
        assert_eq!(model.error_message(), "Location not found");
        assert_eq!(model.error_hint(), "Location not found. Check and try again.");
    }

    #[tokio::test]
    async fn latest_query_wins_over_slow_earlier_one() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("q", "Lima"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(body("Lima", 3))
                    .set_delay(Duration::from_millis(300)),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(query_param("q", "Quito"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body("Quito", 3)))
            .mount(&server)
            .await;

        let mut model = model_for(&server);
        model.search("Lima");
        model.search("Quito");
        settle(&mut model).await;
        assert_eq!(model.location_name(), "Quito");

        // Let the slow Lima response arrive; it must be dropped
        tokio::time::sleep(Duration::from_millis(500)).await;
        assert!(!model.poll());
        assert_eq!(model.location_name(), "Quito");
    }

    #[tokio::test]
    async fn rejected_search_drops_pending_fetch_and_report() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("q", "Quito"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body("Quito", 3)))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(query_param("q", "Lima"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(body("Lima", 3))
                    .set_delay(Duration::from_millis(200)),
            )
            .mount(&server)
            .await;

        let mut model = model_for(&server);
        model.search("Quito");
        settle(&mut model).await;
        assert!(model.has_data());

        model.search("Lima");
        assert!(!model.search("   "));
        assert!(!model.is_loading());
        assert!(!model.has_data());

        // The Lima response is now stale and must not come back on screen
        tokio::time::sleep(Duration::from_millis(400)).await;
        assert!(!model.poll());
        assert!(!model.has_data());
        assert_eq!(model.error_message(), "Place name is empty");
    }

    #[tokio::test]
    async fn rejected_point_clears_shown_report() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("q", "Quito"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body("Quito", 3)))
            .mount(&server)
            .await;

        let mut model = model_for(&server);
        model.search("Quito");
        settle(&mut model).await;
        assert!(model.has_data());

        assert!(!model.select_point(200.0, 0.0));
        assert!(!model.has_data());
        assert!(model.location_name().is_empty());
        assert!(model.error_message().contains("Latitude"));
    }

    #[tokio::test]
    async fn successful_search_clears_previous_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("q", "Quito"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body("Quito", 3)))
            .mount(&server)
            .await;

        let mut model = model_for(&server);
        assert!(!model.search(""));
        assert!(!model.error_message().is_empty());

        model.search("Quito");
        settle(&mut model).await;

        assert!(model.has_data());
        assert!(model.error_message().is_empty());
        assert!(model.error_hint().is_empty());
    }

    #[tokio::test]
    async fn hourly_keeps_zone_of_fetched_report() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("q", "Quito"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body("Quito", 3)))
            .mount(&server)
            .await;

        let mut model = model_for(&server);
        model.search("Quito");
        settle(&mut model).await;

        model
            .services
            .set_grouping_zone(GroupingZone::Named(chrono_tz::Europe::Madrid));

        assert_eq!(model.hourly()[0].time, "00:00");
    }

    #[tokio::test]
    async fn unconfigured_services_report_not_initialized() {
        let services = AppServices::with_handle(tokio::runtime::Handle::current());
        let mut model = ForecastModel::new(services);

        model.search("Lima");
        assert!(model.poll());

        assert!(!model.is_loading());
        assert!(model.error_message().contains("not initialized"));
    }
}
