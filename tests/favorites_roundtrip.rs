//! Plugin and favorites worker wired together through the JSON channel the host
//! uses, with the store on a temporary directory.

use reelgrid::storage::JsonStorage;
use reelgrid::worker::handler::FAVORITES_FILE;
use reelgrid::worker::{FavoritesWorker, WorkerMessage, WorkerResponse};
use reelgrid::{handle_event, initialize, Action, AppState, Config, Event, ViewMode};
use std::path::Path;

fn worker_at(dir: &Path) -> FavoritesWorker {
    let store = JsonStorage::new(dir.join(FAVORITES_FILE)).unwrap();
    FavoritesWorker::with_store(Box::new(store))
}

/// Performs every worker action the way the host would: serialize, hand to the
/// worker, serialize the reply, feed it back to the plugin.
fn pump(state: &mut AppState, worker: &mut FavoritesWorker, actions: Vec<Action>) {
    let mut queue = actions;
    while !queue.is_empty() {
        let mut next = Vec::new();
        for action in queue {
            let Action::PostToWorker(message) = action else {
                continue;
            };
            let wire = serde_json::to_string(&message).unwrap();
            let message: WorkerMessage = serde_json::from_str(&wire).unwrap();
            let response = worker.handle_message(message);
            let wire = serde_json::to_string(&response).unwrap();
            let response: WorkerResponse = serde_json::from_str(&wire).unwrap();
            let (_, more) = handle_event(state, &Event::WorkerResponse(response)).unwrap();
            next.extend(more);
        }
        queue = next;
    }
}

fn loaded_page(state: &mut AppState, actions: &[Action]) -> Vec<Action> {
    let request = actions
        .iter()
        .find_map(|a| match a {
            Action::WebRequest(req) => Some(req.clone()),
            _ => None,
        })
        .unwrap();
    let body = serde_json::json!({
        "page": 1,
        "results": [
            {"id": 603, "title": "The Matrix", "vote_average": 8.2, "release_date": "1999-03-30"},
            {"id": 550, "title": "Fight Club", "vote_average": 8.4, "release_date": "1999-10-15"},
        ],
        "total_pages": 1,
        "total_results": 2
    });
    let event = Event::WebResponse {
        status: 200,
        body: body.to_string().into_bytes(),
        context: request.context,
    };
    handle_event(state, &event).unwrap().1
}

#[test]
fn favorite_survives_a_worker_restart() {
    let dir = tempfile::tempdir().unwrap();
    let mut state = initialize(&Config::default());
    let mut worker = worker_at(dir.path());

    handle_event(&mut state, &Event::Resize { rows: 30, cols: 90 }).unwrap();
    let (_, actions) = handle_event(&mut state, &Event::PermissionsGranted).unwrap();
    let after_page = loaded_page(&mut state, &actions);
    pump(&mut state, &mut worker, actions);
    pump(&mut state, &mut worker, after_page);

    let (_, toggle) = handle_event(&mut state, &Event::ToggleFavorite).unwrap();
    assert!(state.favorites.is_favorite(603));
    pump(&mut state, &mut worker, toggle);
    assert!(state.favorites.is_favorite(603));
    assert!(!state.favorites.has_pending());
    drop(worker);

    let mut restarted = worker_at(dir.path());
    let mut fresh = initialize(&Config::default());
    let (_, actions) = handle_event(&mut fresh, &Event::PermissionsGranted).unwrap();
    pump(&mut fresh, &mut restarted, actions);

    assert!(fresh.favorites.is_favorite(603));
    assert!(!fresh.favorites.is_favorite(550));
    let listed: Vec<_> = fresh.favorites.list().into_iter().map(|f| f.title).collect();
    assert_eq!(listed, vec!["The Matrix".to_string()]);
}

#[test]
fn unfavoriting_from_the_favorites_view_empties_the_store() {
    let dir = tempfile::tempdir().unwrap();
    let mut state = initialize(&Config::default());
    let mut worker = worker_at(dir.path());

    handle_event(&mut state, &Event::Resize { rows: 30, cols: 90 }).unwrap();
    let (_, actions) = handle_event(&mut state, &Event::PermissionsGranted).unwrap();
    let after_page = loaded_page(&mut state, &actions);
    pump(&mut state, &mut worker, actions);
    pump(&mut state, &mut worker, after_page);

    let (_, toggle) = handle_event(&mut state, &Event::ToggleFavorite).unwrap();
    pump(&mut state, &mut worker, toggle);

    let (_, actions) = handle_event(&mut state, &Event::ShowFavorites).unwrap();
    pump(&mut state, &mut worker, actions);
    assert_eq!(state.view_mode, ViewMode::Favorites);

    let (_, toggle) = handle_event(&mut state, &Event::ToggleFavorite).unwrap();
    pump(&mut state, &mut worker, toggle);
    assert!(state.favorites.is_empty());

    let reloaded = worker_at(dir.path()).handle_message(WorkerMessage::load_favorites());
    assert_eq!(reloaded, WorkerResponse::FavoritesLoaded { favorites: vec![] });
}
