//! 标签集合模块
//!
//! # 设计思路
//!
//! 管理用户自建的命名集合（"标签"），每个标签持有一组剪贴板条目：
//! - **默认标签不朽**：固定 id 与规范名称 `"默认"`，镜像系统剪贴板历史，
//!   不可删除、不可重命名、不可重排；加载时自愈修复漂移的元数据。
//! - **前移去重**：向标签添加内容等价的条目时，把已有条目提到最前，
//!   绝不产生重复；新内容则以**全新 id 的独立副本**插入头部。
//! - **独立持久化**：标签元数据与各标签条目列表使用各自的存储键，
//!   与默认历史互不共享可变状态。
//!
//! # 实现思路
//!
//! - 条目列表以 `HashMap<Uuid, Vec<ClipItem>>` 存放，序列化为
//!   `{uuid 字符串: [记录]}`，逐键容错（坏键 / 坏记录跳过）。
//! - 默认标签的读取与搜索委托给注入的 `HistoryStore`，本模块
//!   不持有它的引用，由组合根按调用传入。
//! - 拖拽排序沿用"先摘除、后按原坐标落点插入"的语义。

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::history::HistoryStore;
use crate::model::{ClipItem, StoreEvent, Subscriber};
use crate::persist::{self, PersistedRecord};
use crate::storage::{with_storage, SharedStorage};

/// 默认标签的固定 id（跨进程重启稳定，永不重新生成）
pub const DEFAULT_TAB_ID: Uuid = uuid::uuid!("e621e1f8-c36c-495a-93fc-0c247a3e6e5f");
/// 默认标签的规范名称
pub const DEFAULT_TAB_NAME: &str = "默认";

/// 标签元数据
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TabItem {
    pub id: Uuid,
    pub name: String,
    #[serde(rename = "isDefault")]
    pub is_default: bool,
}

impl TabItem {
    fn canonical_default() -> Self {
        Self {
            id: DEFAULT_TAB_ID,
            name: DEFAULT_TAB_NAME.to_string(),
            is_default: true,
        }
    }
}

/// 标签集合注册表
pub struct TabStore {
    storage: SharedStorage,
    tabs: Vec<TabItem>,
    selected_tab_id: Option<Uuid>,
    tab_items: HashMap<Uuid, Vec<ClipItem>>,
    subscribers: Vec<Subscriber>,
}

impl TabStore {
    /// 从存储加载标签元数据与条目，并自愈默认标签
    pub fn new(storage: SharedStorage) -> Self {
        let mut store = Self {
            storage,
            tabs: vec![TabItem::canonical_default()],
            selected_tab_id: Some(DEFAULT_TAB_ID),
            tab_items: HashMap::new(),
            subscribers: Vec::new(),
        };
        store.load_tabs();
        store.load_tab_items();
        store.heal_default_tab();
        store
    }

    /// 订阅变更通知
    pub fn subscribe(&mut self, subscriber: Subscriber) {
        self.subscribers.push(subscriber);
    }

    fn notify(&self, event: StoreEvent) {
        for subscriber in &self.subscribers {
            subscriber(&event);
        }
    }

    // ------------------------------------------------------------------
    // 观察接口
    // ------------------------------------------------------------------

    pub fn tabs(&self) -> &[TabItem] {
        &self.tabs
    }

    pub fn selected_tab_id(&self) -> Option<Uuid> {
        self.selected_tab_id
    }

    /// 是否为默认标签（系统剪贴板）
    pub fn is_default_tab(&self, tab_id: Uuid) -> bool {
        tab_id == DEFAULT_TAB_ID
    }

    /// 选中标签
    pub fn select_tab(&mut self, tab_id: Option<Uuid>) {
        self.selected_tab_id = tab_id;
        self.notify(StoreEvent::SelectionChanged);
    }

    // ------------------------------------------------------------------
    // 标签管理
    // ------------------------------------------------------------------

    /// 新建命名标签（名称去除首尾空白，空名称忽略）
    pub fn create_tab(&mut self, name: &str) -> Result<(), AppError> {
        let name = name.trim();
        if name.is_empty() {
            return Ok(());
        }

        self.tabs.push(TabItem {
            id: Uuid::new_v4(),
            name: name.to_string(),
            is_default: false,
        });
        self.save_tabs()?;
        self.notify(StoreEvent::TabListChanged);
        Ok(())
    }

    /// 删除标签及其条目列表
    ///
    /// 默认标签不可删除，调用是空操作。
    pub fn remove_tab(&mut self, tab_id: Uuid) -> Result<(), AppError> {
        if self.is_default_tab(tab_id) {
            log::debug!("拒绝删除默认标签");
            return Ok(());
        }

        let before = self.tabs.len();
        self.tabs.retain(|tab| tab.id != tab_id);
        if self.tabs.len() == before {
            return Ok(());
        }
        self.tab_items.remove(&tab_id);

        if self.selected_tab_id == Some(tab_id) {
            self.selected_tab_id = Some(DEFAULT_TAB_ID);
        }

        self.save_tabs()?;
        self.save_tab_items()?;
        self.notify(StoreEvent::TabListChanged);
        Ok(())
    }

    // ------------------------------------------------------------------
    // 条目操作
    // ------------------------------------------------------------------

    /// 向标签添加条目
    ///
    /// 已存在内容等价条目时提到最前（不产生重复）；
    /// 否则以全新 id 的独立副本插入头部。
    /// 默认标签直接镜像历史存储，不支持此路径（空操作）。
    pub fn add_item_to_tab(&mut self, item: &ClipItem, tab_id: Uuid) -> Result<(), AppError> {
        if self.is_default_tab(tab_id) {
            log::debug!("默认标签不支持直接添加条目");
            return Ok(());
        }
        if !self.tabs.iter().any(|tab| tab.id == tab_id) {
            log::warn!("向不存在的标签添加条目: {}", tab_id);
            return Ok(());
        }

        let items = self.tab_items.entry(tab_id).or_default();
        if let Some(index) = items
            .iter()
            .position(|existing| existing.content.same_content(&item.content))
        {
            if index > 0 {
                let existing = items.remove(index);
                items.insert(0, existing);
            }
            log::debug!("条目内容已存在于标签中，已移至最前");
        } else {
            items.insert(0, item.independent_copy());
            log::debug!("新条目已添加到标签");
        }

        self.save_tab_items()?;
        self.notify(StoreEvent::TabItemsChanged(tab_id));
        Ok(())
    }

    /// 从标签中按 id 移除条目
    pub fn remove_item_from_tab(&mut self, item_id: Uuid, tab_id: Uuid) -> Result<(), AppError> {
        let Some(items) = self.tab_items.get_mut(&tab_id) else {
            return Ok(());
        };
        let before = items.len();
        items.retain(|item| item.id != item_id);
        if items.len() == before {
            return Ok(());
        }

        self.save_tab_items()?;
        self.notify(StoreEvent::TabItemsChanged(tab_id));
        Ok(())
    }

    /// 在标签内移动条目（拖拽排序）
    ///
    /// `from` 为源下标集合，`destination` 为原坐标系中的落点：
    /// 被移动的条目保持相对顺序，落在原来位于 `destination` 的条目之前。
    /// 默认标签的顺序由历史派生，不可编辑，调用是空操作。
    pub fn move_items(
        &mut self,
        tab_id: Uuid,
        from: &[usize],
        destination: usize,
    ) -> Result<(), AppError> {
        if self.is_default_tab(tab_id) {
            log::debug!("拒绝对默认标签重排序");
            return Ok(());
        }
        let Some(items) = self.tab_items.get_mut(&tab_id) else {
            return Ok(());
        };
        if from.is_empty() || items.is_empty() {
            return Ok(());
        }

        let mut sources: Vec<usize> = from.to_vec();
        sources.sort_unstable();
        sources.dedup();
        if sources.last().copied().unwrap_or(0) >= items.len() || destination > items.len() {
            return Ok(());
        }

        let mut moved = Vec::with_capacity(sources.len());
        for &index in sources.iter().rev() {
            moved.insert(0, items.remove(index));
        }
        let offset = sources.iter().filter(|&&index| index < destination).count();
        let insert_at = (destination - offset).min(items.len());
        for (i, item) in moved.into_iter().enumerate() {
            items.insert(insert_at + i, item);
        }

        self.save_tab_items()?;
        self.notify(StoreEvent::TabItemsChanged(tab_id));
        Ok(())
    }

    /// 获取标签条目
    ///
    /// 默认标签或 `None` 返回历史存储当前窗口的条目；
    /// 其他标签返回自己的列表。
    pub fn get_items(&self, tab_id: Option<Uuid>, history: &HistoryStore) -> Vec<ClipItem> {
        match tab_id {
            None => history.items().to_vec(),
            Some(id) if self.is_default_tab(id) => history.items().to_vec(),
            Some(id) => self.tab_items.get(&id).cloned().unwrap_or_default(),
        }
    }

    /// 在指定标签内搜索
    ///
    /// 空查询等价于 `get_items`；默认标签委托给历史存储的
    /// 全量搜索，其余标签在自己的列表上做同样的投影匹配。
    pub fn search_in_tab(
        &self,
        tab_id: Option<Uuid>,
        query: &str,
        history: &HistoryStore,
    ) -> Vec<ClipItem> {
        if query.is_empty() {
            return self.get_items(tab_id, history);
        }

        match tab_id {
            None => history.filtered_items(query),
            Some(id) if self.is_default_tab(id) => history.filtered_items(query),
            Some(id) => {
                let matched: Vec<ClipItem> = self
                    .tab_items
                    .get(&id)
                    .map(|items| {
                        items
                            .iter()
                            .filter(|item| item.content.matches(query))
                            .cloned()
                            .collect()
                    })
                    .unwrap_or_default();
                log::debug!("在标签中搜索 '{}' 找到 {} 个结果", query, matched.len());
                matched
            }
        }
    }

    /// 重置所有标签数据为出厂状态（仅保留默认标签）
    pub fn reset_all(&mut self) -> Result<(), AppError> {
        self.tabs = vec![TabItem::canonical_default()];
        self.tab_items.clear();
        self.selected_tab_id = Some(DEFAULT_TAB_ID);

        self.save_tabs()?;
        self.save_tab_items()?;
        self.notify(StoreEvent::TabListChanged);
        Ok(())
    }

    // ------------------------------------------------------------------
    // 默认标签自愈
    // ------------------------------------------------------------------

    /// 保证默认标签存在、id 固定、名称规范，且只有一个
    ///
    /// 持久化元数据缺失、id 漂移或名称被改动时就地修复并重新落盘。
    fn heal_default_tab(&mut self) {
        let mut seen_canonical = false;
        let before = self.tabs.len();
        self.tabs.retain(|tab| {
            let claims_default = tab.is_default || tab.id == DEFAULT_TAB_ID;
            if !claims_default {
                return true;
            }
            let canonical =
                tab.is_default && tab.id == DEFAULT_TAB_ID && tab.name == DEFAULT_TAB_NAME;
            if canonical && !seen_canonical {
                seen_canonical = true;
                return true;
            }
            false
        });

        let mut repaired = self.tabs.len() != before;
        if !seen_canonical {
            self.tabs.insert(0, TabItem::canonical_default());
            repaired = true;
        }

        if self
            .selected_tab_id
            .is_none_or(|id| !self.tabs.iter().any(|tab| tab.id == id))
        {
            self.selected_tab_id = Some(DEFAULT_TAB_ID);
        }

        if repaired {
            log::info!("修复默认标签元数据");
            if let Err(err) = self.save_tabs() {
                log::warn!("保存修复后的标签元数据失败: {}", err);
            }
            self.notify(StoreEvent::TabListChanged);
        }
    }

    // ------------------------------------------------------------------
    // 持久化
    // ------------------------------------------------------------------

    fn save_tabs(&self) -> Result<(), AppError> {
        let bytes = serde_json::to_vec(&self.tabs)
            .map_err(|e| AppError::Storage(format!("序列化标签元数据失败: {}", e)))?;
        with_storage(&self.storage, |storage| storage.set(persist::KEY_TABS, &bytes))
    }

    fn load_tabs(&mut self) {
        let bytes = match with_storage(&self.storage, |storage| storage.get(persist::KEY_TABS)) {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return,
            Err(err) => {
                log::warn!("读取标签元数据失败，使用默认标签: {}", err);
                return;
            }
        };

        match serde_json::from_slice::<Vec<TabItem>>(&bytes) {
            Ok(tabs) => self.tabs = tabs,
            Err(err) => {
                log::warn!("解析标签元数据失败，使用默认标签: {}", err);
            }
        }
    }

    fn save_tab_items(&self) -> Result<(), AppError> {
        let mut encodable: HashMap<String, Vec<PersistedRecord>> = HashMap::new();
        for (tab_id, items) in &self.tab_items {
            encodable.insert(
                tab_id.to_string(),
                items.iter().filter_map(persist::encode).collect(),
            );
        }

        let bytes = serde_json::to_vec(&encodable)
            .map_err(|e| AppError::Storage(format!("序列化标签条目失败: {}", e)))?;
        with_storage(&self.storage, |storage| {
            storage.set(persist::KEY_TAB_ITEMS, &bytes)
        })
    }

    fn load_tab_items(&mut self) {
        let bytes = match with_storage(&self.storage, |storage| storage.get(persist::KEY_TAB_ITEMS))
        {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return,
            Err(err) => {
                log::warn!("读取标签条目失败，按空列表处理: {}", err);
                return;
            }
        };

        let encoded: HashMap<String, Vec<PersistedRecord>> =
            match serde_json::from_slice(&bytes) {
                Ok(encoded) => encoded,
                Err(err) => {
                    log::warn!("解析标签条目失败，按空列表处理: {}", err);
                    return;
                }
            };

        self.tab_items.clear();
        for (key, records) in encoded {
            let Ok(tab_id) = Uuid::parse_str(&key) else {
                log::warn!("跳过无效的标签键: {}", key);
                continue;
            };
            let items: Vec<ClipItem> = records.iter().filter_map(persist::decode).collect();
            self.tab_items.insert(tab_id, items);
        }
    }
}
