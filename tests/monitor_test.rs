//! 采集链路的集成测试：
//! 脚本化假剪贴板 → 变化检测 → 分类 → 历史存储 → 标签收藏。

use std::cell::RefCell;
use std::rc::Rc;

use clipdeck::clipboard::{ClipboardMonitor, ClipboardReader};
use clipdeck::history::HistoryStore;
use clipdeck::model::{ClipboardContent, ImageData};
use clipdeck::storage::{shared, MemoryStorage};
use clipdeck::tabs::TabStore;

/// 可编程的假系统剪贴板
#[derive(Default)]
struct ScriptedClipboard {
    change_count: u64,
    types: Vec<String>,
    text: Option<String>,
    image: Option<ImageData>,
    file_urls: Vec<String>,
}

impl ScriptedClipboard {
    fn write_text(&mut self, text: &str) {
        self.clear();
        self.types = vec!["public.utf8-plain-text".into()];
        self.text = Some(text.into());
        self.change_count += 1;
    }

    fn write_rich_text(&mut self, text: &str) {
        self.clear();
        self.types = vec!["public.utf8-plain-text".into(), "public.rtf".into()];
        self.text = Some(text.into());
        self.change_count += 1;
    }

    fn write_image(&mut self) {
        self.clear();
        self.types = vec!["public.png".into()];
        self.image = Some(ImageData { width: 8, height: 8, bytes: vec![0; 256] });
        self.change_count += 1;
    }

    fn write_files(&mut self, urls: &[&str]) {
        self.clear();
        self.types = vec!["public.file-url".into()];
        self.file_urls = urls.iter().map(|u| u.to_string()).collect();
        self.change_count += 1;
    }

    fn clear(&mut self) {
        self.types.clear();
        self.text = None;
        self.image = None;
        self.file_urls.clear();
    }
}

type SharedClipboard = Rc<RefCell<ScriptedClipboard>>;

struct Handle(SharedClipboard);

impl ClipboardReader for Handle {
    fn change_count(&mut self) -> u64 {
        self.0.borrow().change_count
    }
    fn available_types(&mut self) -> Vec<String> {
        self.0.borrow().types.clone()
    }
    fn read_text(&mut self) -> Option<String> {
        self.0.borrow().text.clone()
    }
    fn read_image(&mut self) -> Option<ImageData> {
        self.0.borrow().image.clone()
    }
    fn read_file_urls(&mut self) -> Vec<String> {
        self.0.borrow().file_urls.clone()
    }
}

fn setup() -> (SharedClipboard, ClipboardMonitor, HistoryStore) {
    let clipboard: SharedClipboard = Rc::new(RefCell::new(ScriptedClipboard::default()));
    let monitor = ClipboardMonitor::new(Box::new(Handle(Rc::clone(&clipboard))));
    let history = HistoryStore::new(shared(MemoryStorage::new()), 50, 20);
    (clipboard, monitor, history)
}

#[test]
fn captures_each_kind_with_expected_classification() {
    let (clipboard, mut monitor, mut history) = setup();

    clipboard.borrow_mut().write_text("plain");
    monitor.tick(&mut history).expect("tick text");

    clipboard.borrow_mut().write_rich_text("styled");
    monitor.tick(&mut history).expect("tick rich text");

    clipboard.borrow_mut().write_image();
    monitor.tick(&mut history).expect("tick image");

    clipboard
        .borrow_mut()
        .write_files(&["file:///tmp/a.txt", "file:///tmp/b.txt"]);
    monitor.tick(&mut history).expect("tick files");

    let items = history.filtered_items("");
    assert_eq!(items.len(), 4);
    // 最新在前：文件列表、图片、富文本、纯文本
    assert!(matches!(items[0].content, ClipboardContent::FileList(ref paths) if paths.len() == 2));
    assert!(matches!(items[1].content, ClipboardContent::Image(_)));
    assert!(matches!(items[2].content, ClipboardContent::Text(ref t) if t == "styled"));
    assert!(matches!(items[3].content, ClipboardContent::Text(ref t) if t == "plain"));
}

#[test]
fn repeated_copies_of_same_text_produce_one_entry() {
    let (clipboard, mut monitor, mut history) = setup();

    clipboard.borrow_mut().write_text("same");
    monitor.tick(&mut history).expect("tick");
    clipboard.borrow_mut().write_text("same");
    monitor.tick(&mut history).expect("tick duplicate");

    assert_eq!(history.total_count(), 1);
}

#[test]
fn idle_ticks_cost_nothing_and_capture_nothing() {
    let (clipboard, mut monitor, mut history) = setup();

    for _ in 0..10 {
        monitor.tick(&mut history).expect("idle tick");
    }
    assert_eq!(history.total_count(), 0);

    clipboard.borrow_mut().write_text("once");
    for _ in 0..10 {
        monitor.tick(&mut history).expect("tick");
    }
    assert_eq!(history.total_count(), 1);
}

#[test]
fn captured_item_can_be_curated_into_a_tab() {
    let (clipboard, mut monitor, mut history) = setup();
    let mut tabs = TabStore::new(shared(MemoryStorage::new()));
    tabs.create_tab("收藏").expect("create tab");
    let tab_id = tabs.tabs()[1].id;

    clipboard.borrow_mut().write_text("favorite");
    monitor.tick(&mut history).expect("tick");

    let captured = history.items()[0].clone();
    tabs.add_item_to_tab(&captured, tab_id).expect("curate");

    let in_tab = tabs.get_items(Some(tab_id), &history);
    assert_eq!(in_tab.len(), 1);
    // 标签里的条目是独立实体，id 与历史条目不同
    assert_ne!(in_tab[0].id, captured.id);
    assert!(in_tab[0].content.same_content(&captured.content));
}
