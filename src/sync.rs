use crate::models::Movie;

/// Computes the movies to append: everything on the watchlist that is
/// neither already collected nor already present in the autodl file.
/// Watchlist order is preserved; nothing is ever removed from the
/// destination, so the result is additions only.
pub fn diff(watchlist: &[Movie], collected: &[Movie], present: &[Movie]) -> Vec<Movie> {
    watchlist
        .iter()
        .filter(|movie| !collected.contains(movie) && !present.contains(movie))
        .cloned()
        .collect()
}
