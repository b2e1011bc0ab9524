//! I/O 抽象层.
//!
//! 为封装器输出和命令行输入提供统一的读写接口,
//! 支持文件、内存缓冲区以及不可定位的管道 (stdin/stdout).

use std::io::{self, Read, Seek, Write};

use xing_core::{XingError, XingResult};

/// I/O 上下文
///
/// 封装底层 I/O 后端. 输出端是否支持回写 Xing 头取决于后端能否 seek.
pub struct IoContext {
    /// 内部 I/O 实现
    inner: Box<dyn IoBackend>,
}

/// I/O 后端 trait
///
/// 实现此 trait 以支持不同的 I/O 目标.
pub trait IoBackend: Send {
    /// 读取数据到缓冲区, 返回 0 表示到达末尾
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize>;
    /// 全部写入
    fn write_all(&mut self, buf: &[u8]) -> io::Result<()>;
    /// 刷新缓冲
    fn flush(&mut self) -> io::Result<()>;
    /// 定位 (seek)
    fn seek(&mut self, pos: io::SeekFrom) -> io::Result<u64>;
    /// 获取当前位置
    fn position(&mut self) -> io::Result<u64>;
    /// 获取总大小 (如果可知)
    fn size(&self) -> Option<u64>;
    /// 是否支持 seek
    fn is_seekable(&self) -> bool;
}

impl IoContext {
    /// 从 I/O 后端创建上下文
    pub fn new(backend: Box<dyn IoBackend>) -> Self {
        Self { inner: backend }
    }

    /// 从文件路径打开 (只读)
    pub fn open_read(path: &str) -> XingResult<Self> {
        let file = std::fs::File::open(path)?;
        Ok(Self::new(Box::new(FileBackend::new(file))))
    }

    /// 从文件路径打开 (写入, 截断已有内容)
    pub fn open_write(path: &str) -> XingResult<Self> {
        let file = std::fs::File::create(path)?;
        Ok(Self::new(Box::new(FileBackend::new(file))))
    }

    /// 标准输入 (不可 seek)
    pub fn stdin() -> Self {
        Self::new(Box::new(PipeBackend::reader(io::stdin())))
    }

    /// 标准输出 (不可 seek, 无法回写 Xing 头)
    pub fn stdout() -> Self {
        Self::new(Box::new(PipeBackend::writer(io::stdout())))
    }

    // ========================
    // 读取方法
    // ========================

    /// 读取最多 `buf.len()` 字节, 返回实际读取数, 0 表示到达末尾
    pub fn read(&mut self, buf: &mut [u8]) -> XingResult<usize> {
        loop {
            match self.inner.read(buf) {
                Ok(n) => return Ok(n),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// 读取指定字节数
    pub fn read_exact(&mut self, buf: &mut [u8]) -> XingResult<()> {
        let mut total = 0;
        while total < buf.len() {
            let n = self.read(&mut buf[total..])?;
            if n == 0 {
                return Err(XingError::Eof);
            }
            total += n;
        }
        Ok(())
    }

    /// 读取指定数量的字节
    pub fn read_bytes(&mut self, count: usize) -> XingResult<Vec<u8>> {
        let mut buf = vec![0u8; count];
        self.read_exact(&mut buf)?;
        Ok(buf)
    }

    // ========================
    // 写入方法
    // ========================

    /// 写入全部数据
    pub fn write_all(&mut self, buf: &[u8]) -> XingResult<()> {
        self.inner.write_all(buf)?;
        Ok(())
    }

    /// 刷新输出
    pub fn flush(&mut self) -> XingResult<()> {
        self.inner.flush()?;
        Ok(())
    }

    // ========================
    // 定位方法
    // ========================

    /// 定位 (seek)
    pub fn seek(&mut self, pos: io::SeekFrom) -> XingResult<u64> {
        if !self.inner.is_seekable() {
            return Err(XingError::Unsupported("I/O 后端不支持 seek".into()));
        }
        Ok(self.inner.seek(pos)?)
    }

    /// 获取当前位置
    pub fn position(&mut self) -> XingResult<u64> {
        Ok(self.inner.position()?)
    }

    /// 是否支持随机访问
    pub fn is_seekable(&self) -> bool {
        self.inner.is_seekable()
    }

    /// 获取总大小
    pub fn size(&self) -> Option<u64> {
        self.inner.size()
    }
}

/// 文件 I/O 后端
struct FileBackend {
    file: std::fs::File,
    size: Option<u64>,
}

impl FileBackend {
    fn new(file: std::fs::File) -> Self {
        let size = file.metadata().ok().map(|m| m.len());
        Self { file, size }
    }
}

impl IoBackend for FileBackend {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.file.read(buf)
    }

    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        self.file.write_all(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }

    fn seek(&mut self, pos: io::SeekFrom) -> io::Result<u64> {
        self.file.seek(pos)
    }

    fn position(&mut self) -> io::Result<u64> {
        self.file.stream_position()
    }

    fn size(&self) -> Option<u64> {
        self.size
    }

    fn is_seekable(&self) -> bool {
        true
    }
}

/// 内存缓冲区 I/O 后端
///
/// 用于测试和内存中处理. 可构造为不可 seek, 以模拟管道输出.
pub struct MemoryBackend {
    /// 数据缓冲区
    data: Vec<u8>,
    /// 当前位置
    pos: usize,
    /// 是否允许 seek
    seekable: bool,
}

impl MemoryBackend {
    /// 从已有数据创建 (用于读取)
    pub fn from_data(data: Vec<u8>) -> Self {
        Self {
            data,
            pos: 0,
            seekable: true,
        }
    }

    /// 创建空缓冲区 (用于写入)
    pub fn new() -> Self {
        Self::from_data(Vec::new())
    }

    /// 创建不可 seek 的空缓冲区
    pub fn non_seekable() -> Self {
        Self {
            seekable: false,
            ..Self::new()
        }
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl IoBackend for MemoryBackend {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.pos >= self.data.len() {
            return Ok(0);
        }
        let available = self.data.len() - self.pos;
        let to_read = buf.len().min(available);
        buf[..to_read].copy_from_slice(&self.data[self.pos..self.pos + to_read]);
        self.pos += to_read;
        Ok(to_read)
    }

    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        if self.pos > self.data.len() {
            self.data.resize(self.pos, 0);
        }
        // 覆盖已有数据, 超出部分追加
        let overlap = (self.data.len() - self.pos).min(buf.len());
        self.data[self.pos..self.pos + overlap].copy_from_slice(&buf[..overlap]);
        self.data.extend_from_slice(&buf[overlap..]);
        self.pos += buf.len();
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }

    fn seek(&mut self, pos: io::SeekFrom) -> io::Result<u64> {
        if !self.seekable {
            return Err(io::Error::new(
                io::ErrorKind::Unsupported,
                "内存后端被配置为不可 seek",
            ));
        }
        let new_pos = match pos {
            io::SeekFrom::Start(offset) => offset as i64,
            io::SeekFrom::End(offset) => self.data.len() as i64 + offset,
            io::SeekFrom::Current(offset) => self.pos as i64 + offset,
        };
        if new_pos < 0 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "seek 位置不能为负",
            ));
        }
        self.pos = new_pos as usize;
        Ok(self.pos as u64)
    }

    fn position(&mut self) -> io::Result<u64> {
        Ok(self.pos as u64)
    }

    fn size(&self) -> Option<u64> {
        Some(self.data.len() as u64)
    }

    fn is_seekable(&self) -> bool {
        self.seekable
    }
}

/// 管道 I/O 后端 (stdin/stdout 等), 只能顺序读或顺序写
struct PipeBackend {
    reader: Option<Box<dyn Read + Send>>,
    writer: Option<Box<dyn Write + Send>>,
    /// 已读或已写的字节数
    pos: u64,
}

impl PipeBackend {
    fn reader(reader: impl Read + Send + 'static) -> Self {
        Self {
            reader: Some(Box::new(reader)),
            writer: None,
            pos: 0,
        }
    }

    fn writer(writer: impl Write + Send + 'static) -> Self {
        Self {
            reader: None,
            writer: Some(Box::new(writer)),
            pos: 0,
        }
    }
}

impl IoBackend for PipeBackend {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let reader = self.reader.as_mut().ok_or_else(|| {
            io::Error::new(io::ErrorKind::PermissionDenied, "管道后端不支持读取")
        })?;
        let n = reader.read(buf)?;
        self.pos += n as u64;
        Ok(n)
    }

    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        let writer = self.writer.as_mut().ok_or_else(|| {
            io::Error::new(io::ErrorKind::PermissionDenied, "管道后端不支持写入")
        })?;
        writer.write_all(buf)?;
        self.pos += buf.len() as u64;
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.writer.as_mut() {
            Some(writer) => writer.flush(),
            None => Ok(()),
        }
    }

    fn seek(&mut self, _pos: io::SeekFrom) -> io::Result<u64> {
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "管道后端不支持 seek",
        ))
    }

    fn position(&mut self) -> io::Result<u64> {
        Ok(self.pos)
    }

    fn size(&self) -> Option<u64> {
        None
    }

    fn is_seekable(&self) -> bool {
        false
    }
}
