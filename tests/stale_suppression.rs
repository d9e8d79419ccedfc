//! Property: whatever order proximity-query responses arrive in, the
//! camera list always ends up matching the most recently issued
//! origin/radius pair.

use crux_core::testing::AppTester;
use proptest::prelude::*;

use surveilmap_core::capabilities::{HttpRequest, HttpResponse};
use surveilmap_core::{
    App, Camera, CameraId, CameraStatus, CoreConfig, Effect, Event, Model, NearbyQuery, Ownership,
};

#[derive(Debug, Clone)]
enum SearchChange {
    Radius(u32),
    Pin { lat: f64, lng: f64 },
}

fn change_strategy() -> impl Strategy<Value = SearchChange> {
    prop_oneof![
        proptest::sample::select(vec![500u32, 1000, 2000, 5000]).prop_map(SearchChange::Radius),
        (0u8..5, 0u8..5).prop_map(|(a, b)| SearchChange::Pin {
            lat: 53.50 + f64::from(a) * 0.01,
            lng: 10.00 + f64::from(b) * 0.01,
        }),
    ]
}

fn changes_and_arrival_seed() -> impl Strategy<Value = (Vec<SearchChange>, Vec<u64>)> {
    proptest::collection::vec(change_strategy(), 1..8).prop_flat_map(|changes| {
        let len = changes.len();
        (
            Just(changes),
            proptest::collection::vec(any::<u64>(), len),
        )
    })
}

fn marker_camera(index: u64) -> Camera {
    Camera {
        id: CameraId(index),
        location: format!("Camera {index}"),
        latitude: 53.54,
        longitude: 10.0,
        private_govt: Ownership::Govt,
        owner_name: String::new(),
        contact_no: String::new(),
        coverage: String::new(),
        backup: false,
        connected_network: false,
        status: CameraStatus::Working,
    }
}

fn parse_query(request: &crux_core::Request<HttpRequest>) -> NearbyQuery {
    serde_json::from_slice(request.operation.body().expect("query has a body"))
        .expect("query body parses")
}

proptest! {
    #[test]
    fn displayed_cameras_match_most_recently_issued_pair(
        (changes, arrival_seed) in changes_and_arrival_seed()
    ) {
        let app = AppTester::<App, Effect>::default();
        let mut model = Model {
            config: CoreConfig {
                api_base_url: "http://127.0.0.1:8000".into(),
                map_api_key: String::new(),
            },
            ..Model::default()
        };

        // Every change issues exactly one query; hold them all in flight.
        let mut requests = Vec::new();
        for change in &changes {
            let event = match change {
                SearchChange::Radius(meters) => Event::RadiusSelected { meters: *meters },
                SearchChange::Pin { lat, lng } => Event::PinDropped { lat: *lat, lng: *lng },
            };
            let update = app.update(event, &mut model);
            for effect in update.effects {
                if let Effect::Http(request) = effect {
                    requests.push(request);
                }
            }
        }
        prop_assert_eq!(requests.len(), changes.len());

        let final_query = NearbyQuery::from_stamp(&model.query_stamp());

        // Responses come back in an arbitrary order. Two queries for the
        // same pair are interchangeable (the endpoint is idempotent), so
        // the expected winner is the last-arriving response whose query
        // matches the final pair.
        let mut arrival: Vec<usize> = (0..requests.len()).collect();
        arrival.sort_by_key(|&i| (arrival_seed[i], i));

        let mut expected = None;
        for &i in &arrival {
            if parse_query(&requests[i]) == final_query {
                expected = Some(i as u64);
            }
            let response = HttpResponse::ok_json(&vec![marker_camera(i as u64)])
                .expect("response serializes");
            let update = app
                .resolve(&mut requests[i], Ok(response))
                .expect("response resolves");
            for event in update.events {
                app.update(event, &mut model);
            }
        }

        // The last change always issued a matching query, so a winner exists.
        let winner = expected.expect("a current-pair response must exist");
        prop_assert_eq!(model.cameras.len(), 1);
        prop_assert_eq!(model.cameras[0].id, CameraId(winner));
        prop_assert!(model.query_error.is_none());
    }
}
