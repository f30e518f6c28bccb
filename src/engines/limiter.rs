// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::engines::traits::FetchError;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// 在途请求限制器
///
/// 所有发出网络请求的组件共享同一个实例（克隆共享同一组信号量）。
/// 每个请求先获取所在主机的许可，再获取全局许可；
/// 许可在 drop 时无条件释放，包括错误和超时路径。
#[derive(Clone, Debug)]
pub struct RequestLimiter {
    semaphore: Arc<Semaphore>,
    permits: usize,
    hosts: Arc<Mutex<HashMap<String, Arc<Semaphore>>>>,
    per_host: usize,
}

/// 一次请求持有的许可
#[derive(Debug)]
pub struct RequestPermit {
    _host: OwnedSemaphorePermit,
    _global: OwnedSemaphorePermit,
}

impl RequestLimiter {
    /// 创建一个只有全局上限的限制器
    ///
    /// # 参数
    ///
    /// * `permits` - 最大在途请求数，至少为1
    pub fn new(permits: usize) -> Self {
        Self::with_per_host(permits, permits)
    }

    /// 创建同时限制全局和单个主机在途请求数的限制器
    ///
    /// # 参数
    ///
    /// * `permits` - 最大在途请求数，至少为1
    /// * `per_host` - 单个主机的最大在途请求数，至少为1
    pub fn with_per_host(permits: usize, per_host: usize) -> Self {
        let permits = permits.max(1);
        Self {
            semaphore: Arc::new(Semaphore::new(permits)),
            permits,
            hosts: Arc::new(Mutex::new(HashMap::new())),
            per_host: per_host.max(1),
        }
    }

    /// 为指定主机获取一个请求许可
    pub async fn acquire(&self, host: &str) -> Result<RequestPermit, FetchError> {
        // Host first so a request queued on a busy host does not hold a global slot
        let host = self
            .host_semaphore(host)
            .acquire_owned()
            .await
            .map_err(|_| FetchError::LimiterClosed)?;
        let global = self
            .semaphore
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| FetchError::LimiterClosed)?;

        Ok(RequestPermit {
            _host: host,
            _global: global,
        })
    }

    fn host_semaphore(&self, host: &str) -> Arc<Semaphore> {
        let mut hosts = self.hosts.lock().unwrap_or_else(|e| e.into_inner());
        hosts
            .entry(host.to_ascii_lowercase())
            .or_insert_with(|| Arc::new(Semaphore::new(self.per_host)))
            .clone()
    }

    /// 当前可用的全局许可数
    pub fn available(&self) -> usize {
        self.semaphore.available_permits()
    }

    /// 全局许可总数
    pub fn capacity(&self) -> usize {
        self.permits
    }

    /// 单个主机的许可上限
    pub fn per_host_capacity(&self) -> usize {
        self.per_host
    }

    /// 指定主机当前可用的许可数
    pub fn available_for(&self, host: &str) -> usize {
        self.host_semaphore(host).available_permits()
    }
}
