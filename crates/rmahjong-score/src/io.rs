//! CSV・バックアップの書き出し先（`-` / `.gz` 対応）

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use flate2::Compression;
use flate2::write::GzEncoder;

/// 出力先（通常ファイル / 標準出力 / gzip）
///
/// gzip の終端やファイルの同期で起きるエラーは `close` でしか拾えない。
#[must_use = "close() で書き込みエラーを確認する"]
pub enum Writer {
    Plain(BufWriter<File>),
    Stdout(io::Stdout),
    Gz(GzEncoder<File>),
}

impl Writer {
    fn inner(&mut self) -> &mut dyn Write {
        match self {
            Writer::Plain(w) => w,
            Writer::Stdout(w) => w,
            Writer::Gz(w) => w,
        }
    }

    /// 書き込みを確定する（gzip は終端ブロックを書き出す）
    pub fn close(self) -> io::Result<()> {
        let file = match self {
            Writer::Stdout(mut s) => return s.flush(),
            Writer::Plain(w) => w.into_inner().map_err(|e| e.into_error())?,
            Writer::Gz(w) => w.finish()?,
        };
        file.sync_all()
    }
}

impl Write for Writer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner().write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner().flush()
    }
}

/// `-` は標準出力、拡張子 `.gz` は gzip 圧縮、それ以外は通常のファイル。
pub fn open_writer<P: AsRef<Path>>(path: P) -> io::Result<Writer> {
    let p = path.as_ref();
    if p.as_os_str() == "-" {
        return Ok(Writer::Stdout(io::stdout()));
    }
    let file = File::create(p)?;
    Ok(if is_gz(p) {
        Writer::Gz(GzEncoder::new(file, Compression::default()))
    } else {
        Writer::Plain(BufWriter::new(file))
    })
}

/// 書き出して閉じるまでを一度に行う
pub fn write_all_to<P: AsRef<Path>>(path: P, bytes: &[u8]) -> io::Result<()> {
    let mut w = open_writer(path)?;
    w.write_all(bytes)?;
    w.close()
}

fn is_gz(p: &Path) -> bool {
    p.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("gz"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    #[test]
    fn test_plain_and_gz_outputs() {
        let dir = tempfile::tempdir().unwrap();
        let plain = dir.path().join("stats.csv");
        write_all_to(&plain, "順位,プレイヤー\n".as_bytes()).unwrap();
        assert_eq!(std::fs::read_to_string(&plain).unwrap(), "順位,プレイヤー\n");

        let gz = dir.path().join("stats.csv.GZ");
        write_all_to(&gz, b"hello").unwrap();
        let mut dec = flate2::read::GzDecoder::new(File::open(&gz).unwrap());
        let mut text = String::new();
        dec.read_to_string(&mut text).unwrap();
        assert_eq!(text, "hello");
    }
}
