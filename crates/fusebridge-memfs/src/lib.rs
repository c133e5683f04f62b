//! In-memory filesystem.
//!
//! All data is ephemeral and lost when the filesystem is dropped. Hard
//! links share one inode, so data written through one name is visible
//! through the other.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use fusebridge::abi::consts::{RENAME_EXCHANGE, RENAME_NOREPLACE, XATTR_CREATE, XATTR_REPLACE};
use fusebridge::abi::TimeKind;
use fusebridge::{Attrs, DirItem, DirIter, FileRef, FuseError, FuseResult, OpSet, Operations, RawPtr, TimeValue};
use parking_lot::RwLock;
use tracing::debug;

const S_IFMT: u32 = 0o170000;
const S_IFDIR: u32 = 0o040000;
const S_IFREG: u32 = 0o100000;
const S_IFLNK: u32 = 0o120000;

/// Largest file the filesystem will hold; growing past it is `EFBIG`.
pub const MAX_FILE_SIZE: usize = 1 << 30;

/// `_IOWR('M', 1, u32)`: increment the `u32` the caller passes in.
pub const IOCTL_INCREMENT: u32 = iowr(b'M', 1, std::mem::size_of::<u32>());

const fn iowr(ty: u8, nr: u8, size: usize) -> u32 {
    (3 << 30) | ((size as u32) << 16) | ((ty as u32) << 8) | nr as u32
}

fn now() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}

#[derive(Debug, Clone)]
enum Content {
    File(Vec<u8>),
    Directory,
    Symlink(String),
}

#[derive(Debug, Clone)]
struct Node {
    content: Content,
    mode: u32,
    nlink: u64,
    uid: u32,
    gid: u32,
    atime: f64,
    mtime: f64,
    ctime: f64,
    xattrs: BTreeMap<String, Vec<u8>>,
}

impl Node {
    fn new(content: Content, mode: u32) -> Self {
        let (uid, gid) = fusebridge::session::context().map_or((0, 0), |ctx| (ctx.uid, ctx.gid));
        let t = now();
        Self {
            content,
            mode,
            nlink: 1,
            uid,
            gid,
            atime: t,
            mtime: t,
            ctime: t,
            xattrs: BTreeMap::new(),
        }
    }

    fn size(&self) -> u64 {
        match &self.content {
            Content::File(data) => data.len() as u64,
            Content::Directory => 0,
            Content::Symlink(target) => target.len() as u64,
        }
    }

    fn is_dir(&self) -> bool {
        matches!(self.content, Content::Directory)
    }

    fn attrs(&self, ino: u64) -> Attrs {
        Attrs::new()
            .ino(ino)
            .mode(self.mode)
            .nlink(self.nlink)
            .size(self.size())
            .owner(self.uid, self.gid)
            .time(TimeKind::Access, self.atime)
            .time(TimeKind::Modify, self.mtime)
            .time(TimeKind::Change, self.ctime)
    }
}

#[derive(Debug)]
struct State {
    nodes: HashMap<u64, Node>,
    paths: BTreeMap<String, u64>,
    next_ino: u64,
}

impl State {
    fn ino(&self, path: &str) -> FuseResult<u64> {
        self.paths.get(path).copied().ok_or_else(FuseError::not_found)
    }

    fn node(&self, path: &str) -> FuseResult<&Node> {
        let ino = self.ino(path)?;
        self.nodes.get(&ino).ok_or_else(FuseError::not_found)
    }

    fn node_mut(&mut self, path: &str) -> FuseResult<&mut Node> {
        let ino = self.ino(path)?;
        self.nodes.get_mut(&ino).ok_or_else(FuseError::not_found)
    }

    /// Paths strictly below `dir`.
    fn descendants(&self, dir: &str) -> Vec<String> {
        let prefix = if dir == "/" { "/".to_string() } else { format!("{dir}/") };
        self.paths
            .range(prefix.clone()..)
            .take_while(|(p, _)| p.starts_with(&prefix))
            .filter(|(p, _)| p.as_str() != dir)
            .map(|(p, _)| p.clone())
            .collect()
    }

    /// Names directly inside `dir`, sorted.
    fn children(&self, dir: &str) -> Vec<(String, u64)> {
        self.descendants(dir)
            .into_iter()
            .filter(|p| parent(p) == dir)
            .filter_map(|p| {
                let ino = self.paths.get(&p).copied()?;
                Some((name(&p).to_string(), ino))
            })
            .collect()
    }

    fn check_parent(&self, path: &str) -> FuseResult<()> {
        if self.node(parent(path))?.is_dir() {
            Ok(())
        } else {
            Err(FuseError::not_a_directory())
        }
    }

    fn insert(&mut self, path: &str, node: Node) -> FuseResult<u64> {
        if self.paths.contains_key(path) {
            return Err(FuseError::exists());
        }
        self.check_parent(path)?;
        let ino = self.next_ino;
        self.next_ino += 1;
        if node.is_dir() {
            self.node_mut(parent(path))?.nlink += 1;
        }
        self.nodes.insert(ino, node);
        self.paths.insert(path.to_string(), ino);
        Ok(ino)
    }

    /// Drop one name; the inode goes once its last link is gone.
    fn remove(&mut self, path: &str) -> FuseResult<()> {
        let ino = self.paths.remove(path).ok_or_else(FuseError::not_found)?;
        let gone = match self.nodes.get_mut(&ino) {
            Some(node) if node.is_dir() => true,
            Some(node) => {
                node.nlink = node.nlink.saturating_sub(1);
                node.ctime = now();
                node.nlink == 0
            }
            None => false,
        };
        if gone && self.nodes.remove(&ino).is_some_and(|n| n.is_dir()) {
            if let Ok(dir) = self.node_mut(parent(path)) {
                dir.nlink = dir.nlink.saturating_sub(1);
            }
        }
        Ok(())
    }

    /// Move `from` and everything below it to `to`.
    fn move_tree(&mut self, from: &str, to: &str) {
        let mut moved = vec![from.to_string()];
        moved.extend(self.descendants(from));
        for old in moved {
            if let Some(ino) = self.paths.remove(&old) {
                let new = format!("{to}{}", &old[from.len()..]);
                self.paths.insert(new, ino);
            }
        }
    }
}

/// Resize file data, refusing sizes past [`MAX_FILE_SIZE`] and reporting
/// allocation failure as `ENOSPC` instead of aborting.
fn resize(data: &mut Vec<u8>, len: usize) -> FuseResult<()> {
    if len > MAX_FILE_SIZE {
        return Err(FuseError::errno(libc::EFBIG));
    }
    if len > data.len() {
        data.try_reserve(len - data.len())
            .map_err(|_| FuseError::errno(libc::ENOSPC))?;
    }
    data.resize(len, 0);
    Ok(())
}

fn parent(path: &str) -> &str {
    match path.rfind('/') {
        Some(0) | None => "/",
        Some(idx) => &path[..idx],
    }
}

fn name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Normalize a path: one leading `/`, no `.`/`..` or empty components.
fn normalize(path: &str) -> String {
    let mut parts: Vec<&str> = Vec::new();
    for component in path.split('/') {
        match component {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            part => parts.push(part),
        }
    }
    format!("/{}", parts.join("/"))
}

fn require(path: Option<&str>) -> FuseResult<String> {
    path.map(normalize).ok_or_else(FuseError::bad_handle)
}

/// In-memory filesystem.
///
/// Thread-safe via an internal `RwLock`.
#[derive(Debug)]
pub struct MemFs {
    state: RwLock<State>,
    next_fh: AtomicU64,
}

impl Default for MemFs {
    fn default() -> Self {
        Self::new()
    }
}

impl MemFs {
    pub fn new() -> Self {
        let mut root = Node::new(Content::Directory, S_IFDIR | 0o755);
        root.nlink = 2;
        let mut nodes = HashMap::new();
        nodes.insert(1, root);
        let mut paths = BTreeMap::new();
        paths.insert("/".to_string(), 1);
        Self {
            state: RwLock::new(State {
                nodes,
                paths,
                next_ino: 2,
            }),
            next_fh: AtomicU64::new(0),
        }
    }

    fn handle(&self) -> u64 {
        self.next_fh.fetch_add(1, Ordering::Relaxed) + 1
    }
}

impl Operations for MemFs {
    fn supported(&self) -> OpSet {
        OpSet::GETATTR
            | OpSet::READLINK
            | OpSet::MKNOD
            | OpSet::MKDIR
            | OpSet::UNLINK
            | OpSet::RMDIR
            | OpSet::SYMLINK
            | OpSet::RENAME
            | OpSet::LINK
            | OpSet::CHMOD
            | OpSet::CHOWN
            | OpSet::TRUNCATE
            | OpSet::OPEN
            | OpSet::READ
            | OpSet::WRITE
            | OpSet::STATFS
            | OpSet::SETXATTR
            | OpSet::GETXATTR
            | OpSet::LISTXATTR
            | OpSet::REMOVEXATTR
            | OpSet::READDIR
            | OpSet::CREATE
            | OpSet::UTIMENS
            | OpSet::IOCTL
    }

    fn getattr(&self, path: Option<&str>, _fh: Option<FileRef<'_>>) -> FuseResult<Attrs> {
        let path = require(path)?;
        let state = self.state.read();
        let ino = state.ino(&path)?;
        Ok(state.node(&path)?.attrs(ino))
    }

    fn chmod(&self, path: &str, mode: u32, _fh: Option<FileRef<'_>>) -> FuseResult<()> {
        let mut state = self.state.write();
        let node = state.node_mut(&normalize(path))?;
        node.mode = (node.mode & S_IFMT) | (mode & !S_IFMT);
        node.ctime = now();
        Ok(())
    }

    fn chown(&self, path: &str, uid: i64, gid: i64, _fh: Option<FileRef<'_>>) -> FuseResult<()> {
        let mut state = self.state.write();
        let node = state.node_mut(&normalize(path))?;
        if uid != -1 {
            node.uid = u32::try_from(uid).map_err(|_| FuseError::invalid())?;
        }
        if gid != -1 {
            node.gid = u32::try_from(gid).map_err(|_| FuseError::invalid())?;
        }
        node.ctime = now();
        Ok(())
    }

    fn truncate(&self, path: Option<&str>, length: i64, _fh: Option<FileRef<'_>>) -> FuseResult<()> {
        let path = require(path)?;
        let length = usize::try_from(length).map_err(|_| FuseError::invalid())?;
        let mut state = self.state.write();
        let node = state.node_mut(&path)?;
        match &mut node.content {
            Content::File(data) => resize(data, length)?,
            Content::Directory => return Err(FuseError::is_a_directory()),
            Content::Symlink(_) => return Err(FuseError::invalid()),
        }
        let t = now();
        node.mtime = t;
        node.ctime = t;
        Ok(())
    }

    fn utimens(&self, path: &str, times: Option<(TimeValue, TimeValue)>) -> FuseResult<()> {
        let mut state = self.state.write();
        let node = state.node_mut(&normalize(path))?;
        let (atime, mtime) = match times {
            Some((atime, mtime)) => (atime.as_f64(), mtime.as_f64()),
            None => {
                let t = now();
                (t, t)
            }
        };
        node.atime = atime;
        node.mtime = mtime;
        Ok(())
    }

    fn statfs(&self, _path: &str) -> FuseResult<Attrs> {
        Ok(Attrs::new()
            .with("f_bsize", 512)
            .with("f_blocks", 4096)
            .with("f_bavail", 2048))
    }

    fn readlink(&self, path: &str) -> FuseResult<String> {
        let state = self.state.read();
        match &state.node(&normalize(path))?.content {
            Content::Symlink(target) => Ok(target.clone()),
            _ => Err(FuseError::invalid()),
        }
    }

    fn mknod(&self, path: &str, mode: u32, _dev: u64) -> FuseResult<()> {
        let mode = if mode & S_IFMT == 0 { mode | S_IFREG } else { mode };
        if mode & S_IFMT != S_IFREG {
            return Err(FuseError::errno(libc::EPERM));
        }
        let mut state = self.state.write();
        state.insert(&normalize(path), Node::new(Content::File(Vec::new()), mode))?;
        Ok(())
    }

    fn mkdir(&self, path: &str, mode: u32) -> FuseResult<()> {
        let mut node = Node::new(Content::Directory, S_IFDIR | (mode & !S_IFMT));
        node.nlink = 2;
        self.state.write().insert(&normalize(path), node)?;
        Ok(())
    }

    fn unlink(&self, path: &str) -> FuseResult<()> {
        let path = normalize(path);
        let mut state = self.state.write();
        if state.node(&path)?.is_dir() {
            return Err(FuseError::is_a_directory());
        }
        state.remove(&path)
    }

    fn rmdir(&self, path: &str) -> FuseResult<()> {
        let path = normalize(path);
        if path == "/" {
            return Err(FuseError::errno(libc::EBUSY));
        }
        let mut state = self.state.write();
        if !state.node(&path)?.is_dir() {
            return Err(FuseError::not_a_directory());
        }
        if !state.children(&path).is_empty() {
            return Err(FuseError::not_empty());
        }
        state.remove(&path)
    }

    fn symlink(&self, target: &str, source: &str) -> FuseResult<()> {
        let node = Node::new(Content::Symlink(source.to_string()), S_IFLNK | 0o777);
        self.state.write().insert(&normalize(target), node)?;
        Ok(())
    }

    fn rename(&self, old: &str, new: &str, flags: u32) -> FuseResult<()> {
        let (old, new) = (normalize(old), normalize(new));
        if old == "/" || new.starts_with(&format!("{old}/")) {
            return Err(FuseError::invalid());
        }
        let mut state = self.state.write();
        let moving = state.ino(&old)?;
        state.check_parent(&new)?;

        if flags & RENAME_EXCHANGE != 0 {
            if old.starts_with(&format!("{new}/")) {
                return Err(FuseError::invalid());
            }
            let old_dir = state.node(&old)?.is_dir();
            let new_dir = state.node(&new)?.is_dir();
            // A directory swapped for a non-directory moves one ".." link
            // between the two parents.
            if old_dir != new_dir && parent(&old) != parent(&new) {
                let (gains, loses) = if old_dir {
                    (parent(&new), parent(&old))
                } else {
                    (parent(&old), parent(&new))
                };
                state.node_mut(loses)?.nlink -= 1;
                state.node_mut(gains)?.nlink += 1;
            }
            // NUL never appears in a kernel path, so the parking spot is free.
            let parked = "\0exchange";
            state.move_tree(&old, parked);
            state.move_tree(&new, &old);
            state.move_tree(parked, &new);
            let t = now();
            state.node_mut(&old)?.ctime = t;
            state.node_mut(&new)?.ctime = t;
            return Ok(());
        }

        if let Some(existing) = state.paths.get(&new).copied() {
            if flags & RENAME_NOREPLACE != 0 {
                return Err(FuseError::exists());
            }
            if existing == moving {
                return Ok(());
            }
            let moving_dir = state.node(&old)?.is_dir();
            let existing_dir = state.node(&new)?.is_dir();
            match (moving_dir, existing_dir) {
                (true, false) => return Err(FuseError::not_a_directory()),
                (false, true) => return Err(FuseError::is_a_directory()),
                (true, true) if !state.children(&new).is_empty() => return Err(FuseError::not_empty()),
                _ => {}
            }
            state.remove(&new)?;
        }

        let is_dir = state.node(&old)?.is_dir();
        if is_dir && parent(&old) != parent(&new) {
            state.node_mut(parent(&old))?.nlink -= 1;
            state.node_mut(parent(&new))?.nlink += 1;
        }
        state.move_tree(&old, &new);
        state.node_mut(&new)?.ctime = now();
        Ok(())
    }

    fn link(&self, target: &str, source: &str) -> FuseResult<()> {
        let (target, source) = (normalize(target), normalize(source));
        let mut state = self.state.write();
        let ino = state.ino(&source)?;
        if state.node(&source)?.is_dir() {
            return Err(FuseError::errno(libc::EPERM));
        }
        if state.paths.contains_key(&target) {
            return Err(FuseError::exists());
        }
        state.check_parent(&target)?;
        state.paths.insert(target, ino);
        let node = state.node_mut(&source)?;
        node.nlink += 1;
        node.ctime = now();
        Ok(())
    }

    fn open(&self, path: &str, _flags: i32) -> FuseResult<u64> {
        self.state.read().node(&normalize(path))?;
        Ok(self.handle())
    }

    fn create(&self, path: &str, mode: u32) -> FuseResult<u64> {
        let node = Node::new(Content::File(Vec::new()), S_IFREG | (mode & !S_IFMT));
        self.state.write().insert(&normalize(path), node)?;
        Ok(self.handle())
    }

    fn read(&self, path: Option<&str>, size: usize, offset: i64, _fh: FileRef<'_>) -> FuseResult<Vec<u8>> {
        let path = require(path)?;
        let offset = usize::try_from(offset).map_err(|_| FuseError::invalid())?;
        let state = self.state.read();
        match &state.node(&path)?.content {
            Content::File(data) => {
                let start = offset.min(data.len());
                let end = start.saturating_add(size).min(data.len());
                Ok(data[start..end].to_vec())
            }
            Content::Directory => Err(FuseError::is_a_directory()),
            Content::Symlink(_) => Err(FuseError::invalid()),
        }
    }

    fn write(&self, path: Option<&str>, data: &[u8], offset: i64, _fh: FileRef<'_>) -> FuseResult<usize> {
        let path = require(path)?;
        let offset = usize::try_from(offset).map_err(|_| FuseError::invalid())?;
        let mut state = self.state.write();
        let node = state.node_mut(&path)?;
        match &mut node.content {
            Content::File(file) => {
                let end = offset
                    .checked_add(data.len())
                    .ok_or_else(|| FuseError::errno(libc::EFBIG))?;
                if end > file.len() {
                    resize(file, end)?;
                }
                file[offset..end].copy_from_slice(data);
            }
            Content::Directory => return Err(FuseError::is_a_directory()),
            Content::Symlink(_) => return Err(FuseError::invalid()),
        }
        node.mtime = now();
        Ok(data.len())
    }

    fn ioctl(
        &self,
        _path: Option<&str>,
        cmd: u32,
        _arg: RawPtr,
        _fh: FileRef<'_>,
        _flags: u32,
        data: RawPtr,
    ) -> FuseResult<i32> {
        if cmd != IOCTL_INCREMENT {
            return Err(FuseError::no_ioctl());
        }
        if data.is_null() {
            return Err(FuseError::invalid());
        }
        let ptr = data.cast::<u32>();
        unsafe {
            let value = ptr.read_unaligned();
            debug!("ioctl increment {value}");
            ptr.write_unaligned(value.wrapping_add(1));
        }
        Ok(0)
    }

    fn setxattr(&self, path: &str, name: &str, value: &[u8], flags: i32, _position: u32) -> FuseResult<()> {
        let mut state = self.state.write();
        let node = state.node_mut(&normalize(path))?;
        let present = node.xattrs.contains_key(name);
        if flags & XATTR_CREATE != 0 && present {
            return Err(FuseError::exists());
        }
        if flags & XATTR_REPLACE != 0 && !present {
            return Err(FuseError::no_attribute());
        }
        node.xattrs.insert(name.to_string(), value.to_vec());
        node.ctime = now();
        Ok(())
    }

    fn getxattr(&self, path: &str, name: &str, _position: u32) -> FuseResult<Vec<u8>> {
        let state = self.state.read();
        state
            .node(&normalize(path))?
            .xattrs
            .get(name)
            .cloned()
            .ok_or_else(FuseError::no_attribute)
    }

    fn listxattr(&self, path: &str) -> FuseResult<Vec<String>> {
        let state = self.state.read();
        Ok(state.node(&normalize(path))?.xattrs.keys().cloned().collect())
    }

    fn removexattr(&self, path: &str, name: &str) -> FuseResult<()> {
        let mut state = self.state.write();
        let node = state.node_mut(&normalize(path))?;
        node.xattrs.remove(name).ok_or_else(FuseError::no_attribute)?;
        node.ctime = now();
        Ok(())
    }

    /// `.`, `..`, then the children in name order. Entry offsets count
    /// from 1 so a listing can resume where the reply buffer filled.
    fn readdir<'a>(&'a self, path: Option<&str>, offset: i64, _fh: u64, _flags: u32) -> FuseResult<DirIter<'a>> {
        let path = require(path)?;
        let state = self.state.read();
        if !state.node(&path)?.is_dir() {
            return Err(FuseError::not_a_directory());
        }
        let mut items = vec![DirItem::from("."), DirItem::from("..")];
        for (name, ino) in state.children(&path) {
            let attrs = state.nodes.get(&ino).map(|node| node.attrs(ino));
            items.push(DirItem::entry(name, attrs, 0));
        }
        drop(state);

        let skip = usize::try_from(offset).unwrap_or(0);
        Ok(Box::new(items.into_iter().enumerate().skip(skip).map(|(idx, item)| {
            let (name, attrs, _) = item.into_parts();
            Ok(DirItem::entry(name, attrs, idx as i64 + 1))
        })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fh() -> FileRef<'static> {
        FileRef::Handle(0)
    }

    fn names(fs: &MemFs, path: &str) -> Vec<String> {
        fs.readdir(Some(path), 0, 0, 0)
            .unwrap()
            .map(|item| item.unwrap().name().to_string())
            .collect()
    }

    #[test]
    fn test_path_helpers() {
        assert_eq!(normalize("a/./b/../c"), "/a/c");
        assert_eq!(normalize("/"), "/");
        assert_eq!(parent("/a/b"), "/a");
        assert_eq!(parent("/a"), "/");
        assert_eq!(name("/a/b"), "b");
    }

    #[test]
    fn test_create_and_read() {
        let fs = MemFs::new();
        fs.create("/test.txt", 0o644).unwrap();
        assert_eq!(fs.write(Some("/test.txt"), b"hello world", 0, fh()).unwrap(), 11);
        assert_eq!(fs.read(Some("/test.txt"), 100, 0, fh()).unwrap(), b"hello world");
        assert_eq!(fs.read(Some("/test.txt"), 5, 6, fh()).unwrap(), b"world");
        assert!(fs.read(Some("/test.txt"), 5, 60, fh()).unwrap().is_empty());
    }

    #[test]
    fn test_create_requires_parent() {
        let fs = MemFs::new();
        assert_eq!(fs.create("/a/b.txt", 0o644).unwrap_err().code(), Some(libc::ENOENT));
        fs.create("/f", 0o644).unwrap();
        assert_eq!(fs.create("/f", 0o644).unwrap_err().code(), Some(libc::EEXIST));
        assert_eq!(fs.create("/f/x", 0o644).unwrap_err().code(), Some(libc::ENOTDIR));
    }

    #[test]
    fn test_mkdir_and_readdir() {
        let fs = MemFs::new();
        fs.mkdir("/subdir", 0o755).unwrap();
        fs.create("/subdir/file.txt", 0o644).unwrap();
        fs.create("/root.txt", 0o644).unwrap();

        assert_eq!(names(&fs, "/"), vec![".", "..", "root.txt", "subdir"]);
        assert_eq!(names(&fs, "/subdir"), vec![".", "..", "file.txt"]);

        let attrs = fs.getattr(Some("/"), None).unwrap();
        assert_eq!(attrs.get("st_nlink").unwrap().as_i64(), 3);
    }

    #[test]
    fn test_readdir_resumes_from_offset() {
        let fs = MemFs::new();
        for name in ["a", "b", "c"] {
            fs.create(&format!("/{name}"), 0o644).unwrap();
        }
        let rest: Vec<(String, i64)> = fs
            .readdir(Some("/"), 3, 0, 0)
            .unwrap()
            .map(|item| {
                let (name, _, offset) = item.unwrap().into_parts();
                (name, offset)
            })
            .collect();
        assert_eq!(rest, vec![("b".to_string(), 4), ("c".to_string(), 5)]);
    }

    #[test]
    fn test_unlink_and_rmdir() {
        let fs = MemFs::new();
        fs.mkdir("/d", 0o755).unwrap();
        fs.create("/d/f", 0o644).unwrap();
        assert_eq!(fs.rmdir("/d").unwrap_err().code(), Some(libc::ENOTEMPTY));
        assert_eq!(fs.unlink("/d").unwrap_err().code(), Some(libc::EISDIR));
        fs.unlink("/d/f").unwrap();
        fs.rmdir("/d").unwrap();
        assert_eq!(fs.getattr(Some("/d"), None).unwrap_err().code(), Some(libc::ENOENT));
        assert_eq!(fs.getattr(Some("/"), None).unwrap().get("st_nlink").unwrap().as_i64(), 2);
    }

    #[test]
    fn test_rename_moves_subtree() {
        let fs = MemFs::new();
        fs.mkdir("/a", 0o755).unwrap();
        fs.create("/a/f", 0o644).unwrap();
        fs.write(Some("/a/f"), b"content", 0, fh()).unwrap();
        fs.rename("/a", "/b", 0).unwrap();
        assert!(fs.getattr(Some("/a"), None).is_err());
        assert_eq!(fs.read(Some("/b/f"), 100, 0, fh()).unwrap(), b"content");
    }

    #[test]
    fn test_rename_flags() {
        let fs = MemFs::new();
        fs.create("/x", 0o644).unwrap();
        fs.create("/y", 0o644).unwrap();
        fs.write(Some("/x"), b"x", 0, fh()).unwrap();
        fs.write(Some("/y"), b"y", 0, fh()).unwrap();

        assert_eq!(fs.rename("/x", "/y", RENAME_NOREPLACE).unwrap_err().code(), Some(libc::EEXIST));
        fs.rename("/x", "/y", RENAME_EXCHANGE).unwrap();
        assert_eq!(fs.read(Some("/x"), 1, 0, fh()).unwrap(), b"y");
        assert_eq!(fs.read(Some("/y"), 1, 0, fh()).unwrap(), b"x");

        fs.rename("/x", "/y", 0).unwrap();
        assert!(fs.getattr(Some("/x"), None).is_err());
        assert_eq!(fs.read(Some("/y"), 1, 0, fh()).unwrap(), b"y");
    }

    #[test]
    fn test_exchange_across_parents_moves_dir_link() {
        let fs = MemFs::new();
        let nlink = |path: &str| fs.getattr(Some(path), None).unwrap().get("st_nlink").unwrap().as_i64();
        fs.mkdir("/a", 0o755).unwrap();
        fs.mkdir("/a/x", 0o755).unwrap();
        fs.create("/y", 0o644).unwrap();
        assert_eq!(nlink("/"), 3);
        assert_eq!(nlink("/a"), 3);

        fs.rename("/a/x", "/y", RENAME_EXCHANGE).unwrap();
        assert_eq!(nlink("/a"), 2);
        assert_eq!(nlink("/"), 4);
        let mode = fs.getattr(Some("/y"), None).unwrap().get("st_mode").unwrap().as_i64() as u32;
        assert_eq!(mode & S_IFMT, S_IFDIR);

        // Swapping back restores the counts, and rmdir then balances out.
        fs.rename("/y", "/a/x", RENAME_EXCHANGE).unwrap();
        assert_eq!(nlink("/a"), 3);
        assert_eq!(nlink("/"), 3);
        fs.rmdir("/a/x").unwrap();
        assert_eq!(nlink("/a"), 2);
    }

    #[test]
    fn test_exchange_with_own_ancestor_is_invalid() {
        let fs = MemFs::new();
        fs.mkdir("/a", 0o755).unwrap();
        fs.mkdir("/a/x", 0o755).unwrap();
        assert_eq!(fs.rename("/a/x", "/a", RENAME_EXCHANGE).unwrap_err().code(), Some(libc::EINVAL));
        assert_eq!(fs.rename("/a", "/a/x", RENAME_EXCHANGE).unwrap_err().code(), Some(libc::EINVAL));
    }

    #[test]
    fn test_symlink_and_hard_link() {
        let fs = MemFs::new();
        fs.create("/file", 0o644).unwrap();
        fs.symlink("/link", "file").unwrap();
        assert_eq!(fs.readlink("/link").unwrap(), "file");
        let mode = fs.getattr(Some("/link"), None).unwrap().get("st_mode").unwrap().as_i64() as u32;
        assert_eq!(mode & S_IFMT, S_IFLNK);

        fs.link("/hard", "/file").unwrap();
        fs.write(Some("/hard"), b"shared", 0, fh()).unwrap();
        assert_eq!(fs.read(Some("/file"), 10, 0, fh()).unwrap(), b"shared");
        assert_eq!(fs.getattr(Some("/file"), None).unwrap().get("st_nlink").unwrap().as_i64(), 2);

        fs.unlink("/file").unwrap();
        assert_eq!(fs.read(Some("/hard"), 10, 0, fh()).unwrap(), b"shared");
    }

    #[test]
    fn test_chmod_keeps_type_and_chown_honours_unchanged() {
        let fs = MemFs::new();
        fs.create("/f", 0o644).unwrap();
        fs.chmod("/f", 0o600, None).unwrap();
        fs.chown("/f", 7, 8, None).unwrap();
        fs.chown("/f", -1, -1, None).unwrap();
        let attrs = fs.getattr(Some("/f"), None).unwrap();
        assert_eq!(attrs.get("st_mode").unwrap().as_i64() as u32, S_IFREG | 0o600);
        assert_eq!(attrs.get("st_uid").unwrap().as_i64(), 7);
        assert_eq!(attrs.get("st_gid").unwrap().as_i64(), 8);
    }

    #[test]
    fn test_truncate_and_utimens() {
        let fs = MemFs::new();
        fs.create("/f", 0o644).unwrap();
        fs.write(Some("/f"), b"hello world", 0, fh()).unwrap();
        fs.truncate(Some("/f"), 5, None).unwrap();
        assert_eq!(fs.read(Some("/f"), 100, 0, fh()).unwrap(), b"hello");

        fs.utimens("/f", Some((TimeValue::Float(10.5), TimeValue::Int(20)))).unwrap();
        let attrs = fs.getattr(Some("/f"), None).unwrap();
        assert_eq!(attrs.get("st_atime").unwrap().as_f64(), 10.5);
        assert_eq!(attrs.get("st_mtime").unwrap().as_f64(), 20.0);
    }

    #[test]
    fn test_oversized_files_are_refused() {
        let fs = MemFs::new();
        fs.create("/f", 0o644).unwrap();
        fs.write(Some("/f"), b"keep", 0, fh()).unwrap();

        let err = fs.truncate(Some("/f"), i64::MAX, None).unwrap_err();
        assert_eq!(err.code(), Some(libc::EFBIG));
        let err = fs.truncate(Some("/f"), MAX_FILE_SIZE as i64 + 1, None).unwrap_err();
        assert_eq!(err.code(), Some(libc::EFBIG));

        let err = fs.write(Some("/f"), b"x", i64::MAX, fh()).unwrap_err();
        assert_eq!(err.code(), Some(libc::EFBIG));
        let err = fs.write(Some("/f"), b"x", MAX_FILE_SIZE as i64, fh()).unwrap_err();
        assert_eq!(err.code(), Some(libc::EFBIG));

        // The file is untouched by the refused requests.
        assert_eq!(fs.read(Some("/f"), 100, 0, fh()).unwrap(), b"keep");
        assert_eq!(fs.getattr(Some("/f"), None).unwrap().get("st_size").unwrap().as_i64(), 4);
    }

    #[test]
    fn test_xattrs() {
        let fs = MemFs::new();
        fs.create("/f", 0o644).unwrap();
        assert_eq!(fs.getxattr("/f", "user.a", 0).unwrap_err(), FuseError::no_attribute());
        assert_eq!(
            fs.setxattr("/f", "user.a", b"1", XATTR_REPLACE, 0).unwrap_err(),
            FuseError::no_attribute()
        );
        fs.setxattr("/f", "user.a", b"1", XATTR_CREATE, 0).unwrap();
        fs.setxattr("/f", "user.b", b"22", 0, 0).unwrap();
        assert_eq!(
            fs.setxattr("/f", "user.a", b"1", XATTR_CREATE, 0).unwrap_err().code(),
            Some(libc::EEXIST)
        );
        assert_eq!(fs.listxattr("/f").unwrap(), vec!["user.a", "user.b"]);
        fs.removexattr("/f", "user.a").unwrap();
        assert_eq!(fs.getxattr("/f", "user.b", 0).unwrap(), b"22");
        assert_eq!(fs.listxattr("/f").unwrap(), vec!["user.b"]);
    }

    #[test]
    fn test_ioctl_increment() {
        let fs = MemFs::new();
        let mut value: u32 = 100;
        let data = RawPtr::new((&mut value as *mut u32).cast());
        fs.ioctl(Some("/"), IOCTL_INCREMENT, RawPtr::null(), fh(), 0, data).unwrap();
        assert_eq!(value, 101);
        assert_eq!(
            fs.ioctl(Some("/"), 0x1234, RawPtr::null(), fh(), 0, data).unwrap_err().code(),
            Some(libc::ENOTTY)
        );
        assert_eq!(IOCTL_INCREMENT, 0xC004_4D01);
    }

    #[test]
    fn test_statfs() {
        let fs = MemFs::new();
        let attrs = fs.statfs("/").unwrap();
        assert_eq!(attrs.get("f_bsize").unwrap().as_i64(), 512);
        assert_eq!(attrs.get("f_bavail").unwrap().as_i64(), 2048);
    }
}
