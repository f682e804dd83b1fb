//! 默认历史存储模块
//!
//! # 设计思路
//!
//! 容量有界、按内容去重、分页加载、变更即持久化的有序集合，
//! 即"默认集合"（系统剪贴板历史）的后备状态：
//! - `all_items`：完整列表，最新在前，长度永不超过 `max_items`，
//!   超出时淘汰最旧（尾部）条目。
//! - `loaded`：当前已物化的窗口，**始终是 `all_items` 的前缀**。
//! - 去重策略为**丢弃新条目**：已有内容等价条目保持原位置与原时间戳。
//!
//! # 实现思路
//!
//! - 分页的人为异步边界建模为两段式令牌 API：`begin_page_load()`
//!   在 `is_loading` 或无更多数据时拒绝（返回 `None`），
//!   `complete_page_load()` 对每个令牌恰好推进一页。宿主可以在两步
//!   之间插入任意延迟；并发的 begin 被守卫拒绝，而不是排队。
//! - 搜索永远针对完整列表，不受分页窗口限制。
//! - 每次变更操作完成后写穿存储并向订阅者发出 `HistoryChanged`。

use uuid::Uuid;

use crate::error::AppError;
use crate::model::{ClipItem, StoreEvent, Subscriber};
use crate::persist;
use crate::storage::{with_storage, SharedStorage};

/// 默认容量上限
pub const DEFAULT_MAX_ITEMS: usize = 500;
/// 默认每页条目数
pub const DEFAULT_PAGE_SIZE: usize = 20;

/// 一次待完成的分页加载令牌
///
/// 只能由 `begin_page_load` 签发，保证每次调用至多推进一页。
#[derive(Debug)]
pub struct PageLoad {
    _token: (),
}

/// 默认历史存储
pub struct HistoryStore {
    storage: SharedStorage,
    max_items: usize,
    page_size: usize,
    all_items: Vec<ClipItem>,
    loaded: Vec<ClipItem>,
    loaded_pages: usize,
    is_loading: bool,
    has_more: bool,
    subscribers: Vec<Subscriber>,
}

impl HistoryStore {
    /// 从存储加载完整历史并物化第一页
    pub fn new(storage: SharedStorage, max_items: usize, page_size: usize) -> Self {
        let mut store = Self {
            storage,
            max_items: max_items.max(1),
            page_size: page_size.max(1),
            all_items: Vec::new(),
            loaded: Vec::new(),
            loaded_pages: 0,
            is_loading: false,
            has_more: true,
            subscribers: Vec::new(),
        };
        store.load_all_items();
        store.load_next_page();
        store
    }

    /// 订阅变更通知
    pub fn subscribe(&mut self, subscriber: Subscriber) {
        self.subscribers.push(subscriber);
    }

    fn notify(&self) {
        for subscriber in &self.subscribers {
            subscriber(&StoreEvent::HistoryChanged);
        }
    }

    // ------------------------------------------------------------------
    // 观察接口
    // ------------------------------------------------------------------

    /// 当前已加载窗口中的条目
    pub fn items(&self) -> &[ClipItem] {
        &self.loaded
    }

    /// 完整列表长度（含未加载部分）
    pub fn total_count(&self) -> usize {
        self.all_items.len()
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn has_more_data(&self) -> bool {
        self.has_more
    }

    // ------------------------------------------------------------------
    // 变更操作
    // ------------------------------------------------------------------

    /// 添加一个条目
    ///
    /// 若已存在内容等价条目则丢弃新条目（原条目保持位置与时间戳不变）；
    /// 否则插入头部，超出容量时淘汰尾部，并写穿存储。
    pub fn add_item(&mut self, item: ClipItem) -> Result<(), AppError> {
        let is_duplicate = self
            .all_items
            .iter()
            .any(|existing| existing.content.same_content(&item.content));
        if is_duplicate {
            log::debug!("⏭️  跳过重复的剪贴板内容");
            return Ok(());
        }

        self.all_items.insert(0, item.clone());
        self.loaded.insert(0, item);

        if self.all_items.len() > self.max_items {
            self.all_items.pop();
            // 保持窗口是完整列表的前缀
            if self.loaded.len() > self.all_items.len() {
                self.loaded.truncate(self.all_items.len());
            }
        }

        self.save_items()?;
        self.notify();
        Ok(())
    }

    /// 按 id 移除条目（完整列表与窗口同时移除）
    pub fn remove_item(&mut self, id: Uuid) -> Result<(), AppError> {
        let before = self.all_items.len();
        self.all_items.retain(|item| item.id != id);
        self.loaded.retain(|item| item.id != id);
        if self.all_items.len() == before {
            return Ok(());
        }

        self.save_items()?;
        self.notify();
        Ok(())
    }

    /// 清空历史并持久化空列表
    pub fn clear_items(&mut self) -> Result<(), AppError> {
        self.all_items.clear();
        self.loaded.clear();
        self.loaded_pages = 0;
        self.has_more = false;

        self.save_items()?;
        self.notify();
        Ok(())
    }

    // ------------------------------------------------------------------
    // 分页
    // ------------------------------------------------------------------

    /// 尝试开启一次分页加载
    ///
    /// 正在加载或没有更多数据时返回 `None`（拒绝，不排队）。
    pub fn begin_page_load(&mut self) -> Option<PageLoad> {
        if self.is_loading || !self.has_more {
            return None;
        }
        self.is_loading = true;
        Some(PageLoad { _token: () })
    }

    /// 完成一次分页加载：把下一个连续分片追加到窗口
    ///
    /// 分片起点取窗口当前长度而不是页计数乘页大小：
    /// 头部插入与中途删除都会移动下标，窗口长度才是始终正确的
    /// "已物化前缀"边界。
    pub fn complete_page_load(&mut self, _load: PageLoad) {
        let start = self.loaded.len();
        let end = (start + self.page_size).min(self.all_items.len());

        if start < self.all_items.len() {
            self.loaded.extend_from_slice(&self.all_items[start..end]);
            self.loaded_pages += 1;
            self.has_more = end < self.all_items.len();
        } else {
            self.has_more = false;
        }

        self.is_loading = false;
        self.notify();
    }

    /// 同步加载下一页（begin + complete）
    pub fn load_next_page(&mut self) {
        if let Some(load) = self.begin_page_load() {
            self.complete_page_load(load);
        }
    }

    /// 清空窗口、重置分页计数并重新加载第一页
    pub fn reset_and_reload(&mut self) {
        self.loaded.clear();
        self.loaded_pages = 0;
        self.has_more = true;
        self.load_next_page();
    }

    // ------------------------------------------------------------------
    // 搜索
    // ------------------------------------------------------------------

    /// 按查询串过滤条目
    ///
    /// 空查询返回当前窗口；非空查询在**完整列表**上做大小写
    /// 不敏感的子串匹配，不受分页窗口限制。
    pub fn filtered_items(&self, query: &str) -> Vec<ClipItem> {
        if query.is_empty() {
            return self.loaded.clone();
        }

        let matched: Vec<ClipItem> = self
            .all_items
            .iter()
            .filter(|item| item.content.matches(query))
            .cloned()
            .collect();
        log::debug!("搜索 '{}' 找到 {} 个结果", query, matched.len());
        matched
    }

    // ------------------------------------------------------------------
    // 持久化
    // ------------------------------------------------------------------

    fn save_items(&self) -> Result<(), AppError> {
        let bounded = &self.all_items[..self.all_items.len().min(self.max_items)];
        let bytes = persist::encode_items(bounded)?;
        with_storage(&self.storage, |storage| {
            storage.set(persist::KEY_HISTORY, &bytes)
        })?;
        log::debug!("保存了 {} 条剪贴板历史记录", bounded.len());
        Ok(())
    }

    fn load_all_items(&mut self) {
        let bytes = match with_storage(&self.storage, |storage| storage.get(persist::KEY_HISTORY)) {
            Ok(Some(bytes)) => bytes,
            Ok(None) => {
                log::info!("没有找到本地存储的剪贴板历史");
                return;
            }
            Err(err) => {
                log::warn!("读取剪贴板历史失败，按空历史处理: {}", err);
                return;
            }
        };

        let mut items = persist::decode_items(&bytes);
        items.truncate(self.max_items);
        self.all_items = items;

        if !self.all_items.is_empty() {
            log::info!("加载了 {} 条剪贴板历史记录", self.all_items.len());
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::HistoryStore;
    use crate::model::{ClipItem, ClipboardContent, ImageData, StoreEvent};
    use crate::storage::{shared, MemoryStorage, SharedStorage};

    fn memory() -> SharedStorage {
        shared(MemoryStorage::new())
    }

    fn store(max_items: usize, page_size: usize) -> HistoryStore {
        HistoryStore::new(memory(), max_items, page_size)
    }

    fn text(s: &str) -> ClipItem {
        ClipItem::new(ClipboardContent::Text(s.into()))
    }

    fn image() -> ClipItem {
        ClipItem::new(ClipboardContent::Image(ImageData { width: 1, height: 1, bytes: vec![0; 4] }))
    }

    #[test]
    fn duplicate_text_is_discarded_and_original_keeps_position() {
        let mut store = store(10, 20);
        let first = text("hello");
        let original_ts = first.timestamp;
        store.add_item(first).expect("first add");
        store.add_item(text("world")).expect("second add");
        store.add_item(text("hello")).expect("duplicate add");

        assert_eq!(store.total_count(), 2);
        // "hello" 仍在尾部，时间戳未被刷新
        assert!(store.items()[1].content.same_content(&ClipboardContent::Text("hello".into())));
        assert_eq!(store.items()[1].timestamp, original_ts);
    }

    #[test]
    fn image_is_always_inserted() {
        let mut store = store(10, 20);
        store.add_item(image()).expect("first image");
        store.add_item(image()).expect("second image");
        assert_eq!(store.total_count(), 2);
    }

    #[test]
    fn capacity_evicts_oldest_tail() {
        let mut store = store(3, 20);
        for s in ["A", "B", "C", "D"] {
            store.add_item(text(s)).expect("add");
        }

        let contents: Vec<String> = store
            .items()
            .iter()
            .map(|item| item.content.search_text())
            .collect();
        assert_eq!(contents, vec!["D", "C", "B"]);
        assert_eq!(store.total_count(), 3);
    }

    #[test]
    fn loaded_window_is_always_a_prefix_of_full_list() {
        let mut store = store(3, 2);
        for s in ["A", "B", "C", "D", "E"] {
            store.add_item(text(s)).expect("add");
        }
        assert!(store.items().len() <= store.total_count());
        for (i, item) in store.items().iter().enumerate() {
            assert_eq!(item.id, store.filtered_items("")[i].id);
        }
    }

    #[test]
    fn remove_item_updates_both_lists_and_persists() {
        let mut store = store(10, 20);
        store.add_item(text("keep")).expect("add keep");
        store.add_item(text("drop")).expect("add drop");
        let drop_id = store.items()[0].id;

        store.remove_item(drop_id).expect("remove");
        assert_eq!(store.total_count(), 1);
        assert_eq!(store.items().len(), 1);
        assert_eq!(store.items()[0].content.search_text(), "keep");
    }

    #[test]
    fn clear_items_persists_empty_history() {
        let storage = memory();
        {
            let mut store = HistoryStore::new(storage.clone(), 10, 20);
            store.add_item(text("a")).expect("add");
            store.clear_items().expect("clear");
            assert_eq!(store.total_count(), 0);
            assert!(!store.has_more_data());
        }

        // 重新加载后历史仍为空，而不是复活旧数据
        let reloaded = HistoryStore::new(storage, 10, 20);
        assert_eq!(reloaded.total_count(), 0);
    }

    #[test]
    fn pagination_walks_contiguous_slices() {
        let storage = memory();
        {
            let mut seed = HistoryStore::new(storage.clone(), 50, 20);
            for i in 0..5 {
                seed.add_item(text(&format!("item-{}", i))).expect("seed");
            }
        }

        let mut store = HistoryStore::new(storage, 50, 2);
        // 构造时已加载第一页
        assert_eq!(store.items().len(), 2);
        assert!(store.has_more_data());

        store.load_next_page();
        assert_eq!(store.items().len(), 4);
        assert!(store.has_more_data());

        store.load_next_page();
        assert_eq!(store.items().len(), 5);
        assert!(!store.has_more_data());

        // 全部加载后再调用是空操作
        store.load_next_page();
        assert_eq!(store.items().len(), 5);
    }

    #[test]
    fn overlapping_page_loads_are_rejected_not_queued() {
        let storage = memory();
        {
            let mut seed = HistoryStore::new(storage.clone(), 50, 20);
            for i in 0..6 {
                seed.add_item(text(&format!("item-{}", i))).expect("seed");
            }
        }

        let mut store = HistoryStore::new(storage, 50, 2);
        let first = store.begin_page_load().expect("first begin succeeds");
        assert!(store.is_loading());
        // 第一次加载未完成时，后续调用被守卫拒绝
        assert!(store.begin_page_load().is_none());
        assert!(store.begin_page_load().is_none());

        store.complete_page_load(first);
        assert!(!store.is_loading());
        // 两次"快速连续"调用只推进了一页
        assert_eq!(store.items().len(), 4);
    }

    #[test]
    fn reset_and_reload_repopulates_first_page() {
        let mut store = store(50, 2);
        for i in 0..5 {
            store.add_item(text(&format!("item-{}", i))).expect("add");
        }
        store.reset_and_reload();
        assert_eq!(store.items().len(), 2);
        assert!(store.has_more_data());
        assert_eq!(store.items()[0].content.search_text(), "item-4");
    }

    #[test]
    fn filtered_items_searches_full_list_not_window() {
        let storage = memory();
        {
            let mut seed = HistoryStore::new(storage.clone(), 50, 20);
            for s in ["hello", "world", "shell"] {
                seed.add_item(text(s)).expect("seed");
            }
        }

        // 窗口只有 1 条，但搜索命中完整列表里的 2 条
        let store = HistoryStore::new(storage, 50, 1);
        assert_eq!(store.items().len(), 1);

        let matched = store.filtered_items("ell");
        assert_eq!(matched.len(), 2);
        assert!(matched.iter().all(|item| item.content.matches("ell")));

        // 空查询返回未过滤的窗口
        assert_eq!(store.filtered_items("").len(), 1);
    }

    #[test]
    fn filtered_items_matches_file_base_names() {
        let mut store = store(10, 20);
        store
            .add_item(ClipItem::new(ClipboardContent::FileList(vec![
                PathBuf::from("/var/data/report.pdf"),
                PathBuf::from("/var/data/notes.txt"),
            ])))
            .expect("add files");

        assert_eq!(store.filtered_items("report").len(), 1);
        assert_eq!(store.filtered_items("NOTES").len(), 1);
        // 目录名不参与投影
        assert!(store.filtered_items("var").is_empty());
    }

    #[test]
    fn mutations_notify_subscribers() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        use std::sync::Arc;

        let mut store = store(10, 20);
        let fired = Arc::new(AtomicUsize::new(0));
        let fired_clone = Arc::clone(&fired);
        store.subscribe(Box::new(move |event| {
            assert_eq!(*event, StoreEvent::HistoryChanged);
            fired_clone.fetch_add(1, Ordering::SeqCst);
        }));

        store.add_item(text("a")).expect("add");
        let id = store.items()[0].id;
        store.remove_item(id).expect("remove");
        store.clear_items().expect("clear");

        assert_eq!(fired.load(Ordering::SeqCst), 3);
    }
}
