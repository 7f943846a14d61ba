//! Maps API response types.
//!
//! These mirror the JSON returned by the Directions and Places
//! Autocomplete endpoints. Only the fields we use are modelled.

use serde::{Deserialize, Serialize};

use super::error::DistanceError;

/// Driving distance and time for a whole route.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteEstimate {
    pub distance_km: f64,

    /// Driving time, when the provider reports one.
    pub duration_mins: Option<f64>,
}

impl RouteEstimate {
    pub fn new(distance_km: f64, duration_mins: Option<f64>) -> Self {
        Self {
            distance_km,
            duration_mins,
        }
    }
}

/// A place suggestion for a partially typed location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceSuggestion {
    pub description: String,
    pub place_id: String,
}

/// A `{ value, text }` pair. Values are metres or seconds.
#[derive(Debug, Clone, Deserialize)]
pub struct TextValue {
    pub value: f64,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RouteLeg {
    pub distance: TextValue,
    #[serde(default)]
    pub duration: Option<TextValue>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Route {
    #[serde(default)]
    pub legs: Vec<RouteLeg>,
}

/// Directions API response.
#[derive(Debug, Clone, Deserialize)]
pub struct DirectionsResponse {
    pub status: String,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub routes: Vec<Route>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Prediction {
    pub description: String,
    pub place_id: String,
}

/// Places Autocomplete API response.
#[derive(Debug, Clone, Deserialize)]
pub struct AutocompleteResponse {
    pub status: String,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub predictions: Vec<Prediction>,
}

/// Map an API-level status to an error. `OK` maps to `Ok`.
fn check_status(status: &str, error_message: Option<&str>, what: &str) -> Result<(), DistanceError> {
    match status {
        "OK" => Ok(()),
        "ZERO_RESULTS" | "NOT_FOUND" => Err(DistanceError::NoRoute(what.to_string())),
        "REQUEST_DENIED" => Err(DistanceError::Unauthorized),
        "OVER_QUERY_LIMIT" | "OVER_DAILY_LIMIT" => Err(DistanceError::RateLimited),
        other => Err(DistanceError::Api {
            status: other.to_string(),
            message: error_message.unwrap_or_default().to_string(),
        }),
    }
}

impl DirectionsResponse {
    /// Sum the legs of the first route.
    ///
    /// `what` describes the request for error messages.
    pub fn into_estimate(self, what: &str) -> Result<RouteEstimate, DistanceError> {
        check_status(&self.status, self.error_message.as_deref(), what)?;

        let route = self
            .routes
            .into_iter()
            .next()
            .ok_or_else(|| DistanceError::NoRoute(what.to_string()))?;

        if route.legs.is_empty() {
            return Err(DistanceError::InvalidResponse(format!("route for {what} has no legs")));
        }

        let metres: f64 = route.legs.iter().map(|l| l.distance.value).sum();
        let seconds: Option<f64> = route
            .legs
            .iter()
            .map(|l| l.duration.as_ref().map(|d| d.value))
            .sum();

        Ok(RouteEstimate {
            distance_km: metres / 1000.0,
            duration_mins: seconds.map(|s| s / 60.0),
        })
    }
}

impl AutocompleteResponse {
    pub fn into_suggestions(self, limit: usize) -> Result<Vec<PlaceSuggestion>, DistanceError> {
        if self.status == "ZERO_RESULTS" {
            return Ok(Vec::new());
        }
        check_status(&self.status, self.error_message.as_deref(), "place search")?;

        Ok(self
            .predictions
            .into_iter()
            .take(limit)
            .map(|p| PlaceSuggestion {
                description: p.description,
                place_id: p.place_id,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_LEG_ROUTE: &str = r#"{
        "status": "OK",
        "routes": [{
            "legs": [
                {"distance": {"value": 12500, "text": "12.5 km"}, "duration": {"value": 1200, "text": "20 mins"}},
                {"distance": {"value": 7500, "text": "7.5 km"}, "duration": {"value": 900, "text": "15 mins"}}
            ]
        }]
    }"#;

    #[test]
    fn sums_all_legs() {
        let resp: DirectionsResponse = serde_json::from_str(TWO_LEG_ROUTE).unwrap();
        let estimate = resp.into_estimate("A to B").unwrap();

        assert_eq!(estimate.distance_km, 20.0);
        assert_eq!(estimate.duration_mins, Some(35.0));
    }

    #[test]
    fn missing_duration_on_any_leg_drops_duration() {
        let json = r#"{
            "status": "OK",
            "routes": [{"legs": [
                {"distance": {"value": 1000}, "duration": {"value": 60}},
                {"distance": {"value": 1000}}
            ]}]
        }"#;
        let resp: DirectionsResponse = serde_json::from_str(json).unwrap();
        let estimate = resp.into_estimate("A to B").unwrap();

        assert_eq!(estimate.distance_km, 2.0);
        assert_eq!(estimate.duration_mins, None);
    }

    #[test]
    fn status_codes_map_to_errors() {
        let cases = [
            ("ZERO_RESULTS", "no route"),
            ("NOT_FOUND", "no route"),
            ("REQUEST_DENIED", "request denied"),
            ("OVER_QUERY_LIMIT", "rate limited"),
            ("INVALID_REQUEST", "API error INVALID_REQUEST"),
        ];

        for (status, expected) in cases {
            let json = format!(r#"{{"status": "{status}", "routes": []}}"#);
            let resp: DirectionsResponse = serde_json::from_str(&json).unwrap();
            let err = resp.into_estimate("A to B").unwrap_err();
            assert!(
                err.to_string().contains(expected),
                "{status}: got {err}"
            );
        }
    }

    #[test]
    fn ok_without_routes_is_no_route() {
        let resp: DirectionsResponse = serde_json::from_str(r#"{"status": "OK"}"#).unwrap();
        assert!(matches!(
            resp.into_estimate("A to B"),
            Err(DistanceError::NoRoute(_))
        ));
    }

    #[test]
    fn autocomplete_predictions_are_limited() {
        let json = r#"{
            "status": "OK",
            "predictions": [
                {"description": "Central Station, Chennai", "place_id": "p1"},
                {"description": "Central Mall, Bengaluru", "place_id": "p2"},
                {"description": "Central Park, New York", "place_id": "p3"}
            ]
        }"#;
        let resp: AutocompleteResponse = serde_json::from_str(json).unwrap();
        let places = resp.into_suggestions(2).unwrap();

        assert_eq!(places.len(), 2);
        assert_eq!(places[0].place_id, "p1");
    }

    #[test]
    fn autocomplete_zero_results_is_empty() {
        let resp: AutocompleteResponse =
            serde_json::from_str(r#"{"status": "ZERO_RESULTS"}"#).unwrap();
        assert!(resp.into_suggestions(5).unwrap().is_empty());
    }
}
