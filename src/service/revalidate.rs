use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::future::Future;

/// 缓存视图失效 (按逻辑路径)
pub trait Revalidator: Send + Sync {
    fn revalidate_path(&self, path: &str);
}

#[derive(Debug, Clone)]
pub struct CachedView {
    pub body: serde_json::Value,
    pub rendered_at: DateTime<Utc>,
}

/// 进程内视图缓存, 路径 -> 已渲染内容
///
/// 每个路径维护一个失效代数; 渲染期间若发生失效, 渲染结果不写入缓存
#[derive(Default)]
pub struct ViewCache {
    views: DashMap<String, CachedView>,
    generations: DashMap<String, u64>,
}

impl ViewCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn generation(&self, path: &str) -> u64 {
        self.generations.get(path).map_or(0, |g| *g)
    }

    /// 命中直接返回, 未命中时渲染并写入; 渲染失败或渲染期间被失效则不缓存
    pub async fn get_or_render<F, Fut, E>(&self, path: &str, render: F) -> Result<serde_json::Value, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<serde_json::Value, E>>,
    {
        if let Some(view) = self.views.get(path) {
            tracing::debug!(path, rendered_at = %view.rendered_at, "view cache hit");
            return Ok(view.body.clone());
        }

        let started = self.generation(path);
        let body = render().await?;

        // 持有代数条目锁完成比较与写入, 与 revalidate_path 的加锁顺序一致
        let generation = self.generations.entry(path.to_string()).or_insert(0);
        if *generation == started {
            self.views.insert(
                path.to_string(),
                CachedView {
                    body: body.clone(),
                    rendered_at: Utc::now(),
                },
            );
        } else {
            tracing::debug!(path, "view invalidated during render, not cached");
        }
        Ok(body)
    }

    #[cfg(test)]
    pub(crate) fn contains(&self, path: &str) -> bool {
        self.views.contains_key(path)
    }
}

impl Revalidator for ViewCache {
    fn revalidate_path(&self, path: &str) {
        let mut generation = self.generations.entry(path.to_string()).or_insert(0);
        *generation += 1;
        if self.views.remove(path).is_some() {
            tracing::info!(path, "cached view invalidated");
        }
    }
}
