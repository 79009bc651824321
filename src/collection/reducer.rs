//! Pure state transitions for a paginated collection.

use std::collections::HashSet;
use std::marker::PhantomData;

use crate::catalog::{CatalogItem, ItemId};
use crate::mvi::Reducer;

use super::intent::CollectionIntent;
use super::state::{CollectionState, Notice, ViewState};

/// Reducer for [`CollectionState`].
pub struct CollectionReducer<I>(PhantomData<I>);

impl<I: CatalogItem> Reducer for CollectionReducer<I> {
    type State = CollectionState<I>;
    type Intent = CollectionIntent<I>;

    fn reduce(mut state: Self::State, intent: Self::Intent) -> Self::State {
        match intent {
            CollectionIntent::Reset { query } => CollectionState {
                generation: state.generation + 1,
                ..CollectionState::new(query)
            },

            CollectionIntent::LoadStarted => {
                state.page.is_loading_page = true;
                state
            }

            CollectionIntent::PageLoaded {
                generation,
                continuation,
                items,
            } => {
                if generation != state.generation {
                    return state;
                }

                let fetched = items.len();
                let merged = if continuation {
                    let mut current = match std::mem::take(&mut state.view) {
                        ViewState::Success(items) => items,
                        _ => Vec::new(),
                    };
                    append_unique(&mut current, items);
                    current
                } else {
                    let mut fresh = Vec::with_capacity(fetched);
                    append_unique(&mut fresh, items);
                    fresh
                };

                state.view = ViewState::Success(merged);
                state.page.current_page += 1;
                state.page.is_last_page = fetched == 0;
                state
            }

            CollectionIntent::PageFailed {
                generation,
                page,
                kind,
            } => {
                if generation != state.generation {
                    return state;
                }

                // Never throw away rendered items because a later page failed.
                if state.items().is_empty() {
                    state.view = ViewState::Error(kind);
                } else {
                    state.notice = Some(Notice::PageLoadFailed { page, kind });
                }
                state
            }

            CollectionIntent::LoadSettled { generation } => {
                if generation == state.generation {
                    state.page.is_loading_page = false;
                }
                state
            }

            CollectionIntent::FavoriteSet { id, value } => {
                set_favorite(&mut state.view, id, value);
                state
            }

            CollectionIntent::FavoriteRolledBack {
                id,
                restored,
                reason,
            } => {
                set_favorite(&mut state.view, id, restored);
                state.notice = Some(Notice::FavoriteNotSaved { id, reason });
                state
            }

            CollectionIntent::LastViewedChanged { index } => {
                state.last_viewed_index = index;
                state
            }

            CollectionIntent::NoticeDismissed => {
                state.notice = None;
                state
            }
        }
    }
}

/// Append `incoming` in order, skipping ids already present.
fn append_unique<I: CatalogItem>(target: &mut Vec<I>, incoming: Vec<I>) {
    let mut seen: HashSet<ItemId> = target.iter().map(CatalogItem::id).collect();
    for item in incoming {
        if seen.insert(item.id()) {
            target.push(item);
        } else {
            tracing::trace!(id = %item.id(), "Dropping duplicate item");
        }
    }
}

fn set_favorite<I: CatalogItem>(view: &mut ViewState<I>, id: ItemId, value: bool) {
    if let ViewState::Success(items) = view {
        for item in items.iter_mut().filter(|item| item.id() == id) {
            *item = item.with_favorite(value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{ErrorKind, Movie, QueryParameters, SortOption};

    type State = CollectionState<Movie>;
    type R = CollectionReducer<Movie>;

    fn movie(id: u64) -> Movie {
        Movie {
            id: ItemId(id),
            title: format!("Movie {}", id),
            overview: String::new(),
            poster_path: None,
            vote_average: 7.0,
            release_date: None,
            is_favorite: false,
        }
    }

    fn movies(ids: std::ops::RangeInclusive<u64>) -> Vec<Movie> {
        ids.map(movie).collect()
    }

    fn loaded(state: State, continuation: bool, items: Vec<Movie>) -> State {
        let generation = state.generation;
        let state = R::reduce(state, CollectionIntent::LoadStarted);
        let state = R::reduce(
            state,
            CollectionIntent::PageLoaded {
                generation,
                continuation,
                items,
            },
        );
        R::reduce(state, CollectionIntent::LoadSettled { generation })
    }

    #[test]
    fn first_page_replaces_and_advances() {
        let state = loaded(State::default(), false, movies(1..=20));

        assert_eq!(state.items().len(), 20);
        assert_eq!(state.page.current_page, 2);
        assert!(!state.page.is_last_page);
        assert!(!state.page.is_loading_page);
    }

    #[test]
    fn continuation_appends_in_order() {
        let state = loaded(State::default(), false, movies(1..=3));
        let state = loaded(state, true, movies(4..=6));

        let ids: Vec<u64> = state.items().iter().map(|m| m.id.0).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5, 6]);
        assert_eq!(state.page.current_page, 3);
    }

    #[test]
    fn continuation_skips_duplicates() {
        let state = loaded(State::default(), false, movies(1..=3));
        let state = loaded(state, true, movies(3..=5));

        let ids: Vec<u64> = state.items().iter().map(|m| m.id.0).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn empty_page_marks_last() {
        let state = loaded(State::default(), false, movies(1..=20));
        let state = loaded(state, true, Vec::new());

        assert_eq!(state.items().len(), 20);
        assert!(state.page.is_last_page);
        assert!(!state.page.can_load_more());
    }

    #[test]
    fn reset_clears_everything_and_bumps_generation() {
        let state = loaded(State::default(), false, movies(1..=5));
        let state = loaded(state, true, Vec::new());
        let state = R::reduce(state, CollectionIntent::LastViewedChanged { index: 4 });

        let query = QueryParameters::default().with_sort(SortOption::RatingDesc);
        let state = R::reduce(state, CollectionIntent::Reset { query: query.clone() });

        assert!(state.view.is_loading());
        assert_eq!(state.page.current_page, 1);
        assert!(!state.page.is_last_page);
        assert_eq!(state.generation, 1);
        assert_eq!(state.last_viewed_index, 0);
        assert_eq!(state.query, query);
    }

    #[test]
    fn stale_results_are_ignored() {
        let state = R::reduce(State::default(), CollectionIntent::LoadStarted);
        let state = R::reduce(
            state,
            CollectionIntent::Reset {
                query: QueryParameters::default().with_search_text("heat"),
            },
        );
        let state = R::reduce(state, CollectionIntent::LoadStarted);

        let state = R::reduce(
            state,
            CollectionIntent::PageLoaded {
                generation: 0,
                continuation: false,
                items: movies(1..=3),
            },
        );
        let state = R::reduce(state, CollectionIntent::LoadSettled { generation: 0 });

        assert!(state.view.is_loading());
        assert!(state.page.is_loading_page);
        assert_eq!(state.page.current_page, 1);
    }

    #[test]
    fn first_page_failure_is_an_error_view() {
        let state = R::reduce(
            State::default(),
            CollectionIntent::PageFailed {
                generation: 0,
                page: 1,
                kind: ErrorKind::NetworkUnreachable,
            },
        );
        assert_eq!(state.view.error(), Some(ErrorKind::NetworkUnreachable));
        assert_eq!(state.page.current_page, 1);
    }

    #[test]
    fn continuation_failure_keeps_items_and_raises_notice() {
        let state = loaded(State::default(), false, movies(1..=20));
        let before = state.view.clone();

        let state = R::reduce(
            state,
            CollectionIntent::PageFailed {
                generation: 0,
                page: 2,
                kind: ErrorKind::RateLimited,
            },
        );

        assert_eq!(state.view, before);
        assert_eq!(state.page.current_page, 2);
        assert_eq!(
            state.notice,
            Some(Notice::PageLoadFailed {
                page: 2,
                kind: ErrorKind::RateLimited
            })
        );

        let state = R::reduce(state, CollectionIntent::NoticeDismissed);
        assert!(state.notice.is_none());
    }

    #[test]
    fn favorite_set_and_rollback_touch_only_the_flag() {
        let state = loaded(State::default(), false, movies(1..=3));
        let page = state.page;

        let state = R::reduce(
            state,
            CollectionIntent::FavoriteSet {
                id: ItemId(2),
                value: true,
            },
        );
        assert!(state.find(ItemId(2)).unwrap().is_favorite);
        assert!(!state.find(ItemId(1)).unwrap().is_favorite);
        assert_eq!(state.page, page);

        let state = R::reduce(
            state,
            CollectionIntent::FavoriteRolledBack {
                id: ItemId(2),
                restored: false,
                reason: "disk full".into(),
            },
        );
        assert!(!state.find(ItemId(2)).unwrap().is_favorite);
        assert!(matches!(
            state.notice,
            Some(Notice::FavoriteNotSaved { id: ItemId(2), .. })
        ));
    }
}
