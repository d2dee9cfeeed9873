/// Check-the-cache-or-compute helper for Redis-backed lookups.
///
/// Returns the cached value when the key is present; otherwise runs the block,
/// stores the result via the non-blocking background writer, and returns it.
///
/// # Arguments
/// * `$cache`: the [`Cache`](crate::db::Cache) instance.
/// * `$key`: the [`CacheKey`](crate::db::CacheKey) for the value.
/// * `$ttl`: time-to-live in seconds.
/// * `$block`: async block computing the value on a cache miss.
#[macro_export]
macro_rules! cached {
    ($cache:expr, $key:expr, $ttl:expr, $block:expr) => {{
        if let Some(cached) = $cache.get_from_cache(&$key).await? {
            Ok(cached)
        } else {
            let value = $block.await?;
            $cache.set_in_background(&$key, &value, $ttl);
            Ok(value)
        }
    }};
}
