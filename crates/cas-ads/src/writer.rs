use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::thread;

use anyhow::{anyhow, Result};
use crossbeam_channel::{bounded, select, unbounded, Receiver, Sender};
use serde::{Deserialize, Serialize};

use crate::record::AdRecord;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum FileMode {
    /// Fail if the file already exists
    Create,
    Append,
    #[default]
    Truncate,
}

impl From<FileMode> for fs_err::OpenOptions {
    fn from(mode: FileMode) -> Self {
        let mut opts = fs_err::OpenOptions::new();
        opts.write(true);
        match mode {
            FileMode::Create => opts.create_new(true),
            FileMode::Append => opts.create(true).append(true),
            FileMode::Truncate => opts.create(true).truncate(true),
        };
        opts
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Output {
    /// One `ad_{id}.json` file per record
    Dir(PathBuf),
    /// One record per line
    JsonLines(PathBuf),
    Stdout,
}

enum RecordWriter {
    Dir { dir: PathBuf, mode: FileMode },
    File(BufWriter<fs_err::File>),
    Stdout(io::Stdout),
}

impl RecordWriter {
    fn open(output: &Output, mode: FileMode) -> Result<Self> {
        match output {
            Output::Dir(dir) => {
                fs_err::create_dir_all(dir)?;
                Ok(Self::Dir {
                    dir: dir.clone(),
                    mode,
                })
            }
            Output::JsonLines(path) => {
                let opts: fs_err::OpenOptions = mode.into();
                Ok(Self::File(BufWriter::new(opts.open(path)?)))
            }
            Output::Stdout => Ok(Self::Stdout(io::stdout())),
        }
    }

    /// Returns `false` when the record was already saved and `Create` keeps it.
    fn write(&mut self, record: &AdRecord) -> Result<bool> {
        match self {
            Self::Dir { dir, mode } => {
                let path = record_path(dir, &record.id);
                let opts: fs_err::OpenOptions = (*mode).into();
                let mut file = match opts.open(&path) {
                    Ok(file) => file,
                    Err(e) if e.kind() == io::ErrorKind::AlreadyExists => return Ok(false),
                    Err(e) => return Err(e.into()),
                };
                file.write_all(&serde_json::to_vec(record)?)?;
            }
            Self::File(wtr) => {
                serde_json::to_writer(&mut *wtr, record)?;
                wtr.write_all(b"\n")?;
            }
            Self::Stdout(out) => {
                let mut out = out.lock();
                serde_json::to_writer(&mut out, record)?;
                out.write_all(b"\n")?;
            }
        }
        Ok(true)
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Self::Dir { .. } => Ok(()),
            Self::File(wtr) => wtr.flush(),
            Self::Stdout(out) => out.flush(),
        }
    }
}

/// Path of the file holding the ad `id` in directory output
pub fn record_path(dir: &Path, id: &str) -> PathBuf {
    dir.join(format!("ad_{id}.json"))
}

/// A writer thread persisting the records it receives
pub struct RecordSink {
    tx_record: Sender<AdRecord>,
    tx_stop: Sender<()>,
    rx_done: Receiver<usize>,
}

impl RecordSink {
    pub fn spawn(output: &Output, mode: FileMode) -> Result<Self> {
        let mut wtr = RecordWriter::open(output, mode)?;

        let (tx_record, rx_record) = unbounded::<AdRecord>();
        let (tx_stop, rx_stop) = bounded::<()>(1);
        let (tx_done, rx_done) = bounded::<usize>(1);

        thread::Builder::new()
            .name("writer".into())
            .spawn(move || {
                let mut written = 0;
                let mut write = |record: AdRecord| match wtr.write(&record) {
                    Ok(true) => written += 1,
                    Ok(false) => log::debug!("Skipping ad {} already saved", record.id),
                    Err(e) => log::error!("Couldn't write record {}: {e}", record.id),
                };
                loop {
                    select! {
                        recv(rx_stop) -> _ => break,
                        recv(rx_record) -> msg => match msg {
                            Ok(record) => write(record),
                            Err(_) => break,
                        },
                    }
                }
                rx_record.try_iter().for_each(&mut write);
                drop(write);
                if let Err(e) = wtr.flush() {
                    log::error!("Couldn't flush records: {e}");
                }
                log::info!("Wrote {written} records");
                tx_done.send(written).ok();
            })?;

        Ok(Self {
            tx_record,
            tx_stop,
            rx_done,
        })
    }

    pub fn sender(&self) -> Sender<AdRecord> {
        self.tx_record.clone()
    }

    /// Writes what is still queued and returns the number of records written.
    pub fn finish(self) -> Result<usize> {
        self.tx_stop.send(()).ok();
        self.rx_done
            .recv()
            .map_err(|_| anyhow!("Record writer stopped unexpectedly"))
    }
}
