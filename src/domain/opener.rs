use std::path::Path;

/// 文書をホストの既定ビューアで開く抽象。Infra層が実装する。
pub trait DocumentOpener {
    fn open(&self, path: &Path) -> std::io::Result<()>;
}
