/// Read-through caching around an async computation.
///
/// Returns the cached value when present. Otherwise awaits `$block`, which
/// must resolve to an `AppResult`, stores the `Ok` value in the background and
/// returns it. Errors propagate and are never cached. The cache generation is
/// read once up front, so an `invalidate` racing with `$block` leaves the
/// fresh value under the generation it was fetched for.
///
/// # Example
/// ```rust,ignore
/// let overview: Option<String> = cached!(cache, CacheKey::Description(id), async move {
///     provider.movie_details(id).await.map(|d| d.overview)
/// })?;
/// ```
#[macro_export]
macro_rules! cached {
    ($cache:expr, $key:expr, $block:expr) => {{
        let generation = $cache.generation();
        if let Some(cached) = $cache.get_from_cache_at(generation, &$key).await {
            Ok(cached)
        } else {
            let value = $block.await?;
            $cache.set_in_background_at(generation, &$key, &value);
            Ok(value)
        }
    }};
}
