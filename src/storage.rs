use crate::model::Roster;
use anyhow::Context;
use fd_lock::RwLock;
use std::ffi::OsString;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tempfile::NamedTempFile;
use tracing::debug;

pub trait Storage {
    /// Charge un roster depuis un support.
    fn load(&self) -> anyhow::Result<Roster>;
    /// Sauvegarde de manière atomique.
    fn save(&self, roster: &Roster) -> anyhow::Result<()>;

    /// Lecture, validation et écriture sérialisées : `f` travaille sur une copie qui n'est
    /// persistée que si elle renvoie `Ok`. Une erreur laisse le support inchangé.
    fn transaction<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut Roster) -> Result<T, E>,
        E: From<anyhow::Error>;
}

/// Roster JSON sur disque. Les transactions prennent un verrou exclusif sur `<fichier>.lock`,
/// partagé par toutes les instances et tous les processus qui ouvrent le même chemin.
pub struct JsonStorage {
    path: PathBuf,
    lock_path: PathBuf,
}

impl JsonStorage {
    pub fn open<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let mut lock_path = OsString::from(path.as_os_str());
        lock_path.push(".lock");
        Ok(Self {
            path,
            lock_path: PathBuf::from(lock_path),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock_file(&self) -> anyhow::Result<RwLock<fs::File>> {
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .read(true)
            .write(true)
            .open(&self.lock_path)
            .with_context(|| format!("opening {}", self.lock_path.display()))?;
        Ok(RwLock::new(file))
    }
}

impl Storage for JsonStorage {
    /// Un fichier absent vaut un roster vide.
    fn load(&self) -> anyhow::Result<Roster> {
        let data = match fs::read(&self.path) {
            Ok(data) => data,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Roster::default()),
            Err(err) => {
                return Err(err).with_context(|| format!("reading {}", self.path.display()))
            }
        };
        let roster: Roster = serde_json::from_slice(&data)
            .with_context(|| format!("parsing {}", self.path.display()))?;
        Ok(roster)
    }

    fn save(&self, roster: &Roster) -> anyhow::Result<()> {
        let json = serde_json::to_vec_pretty(roster)?;
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut tmp = NamedTempFile::new_in(dir).with_context(|| "creating temp file")?;
        tmp.write_all(&json)?;
        tmp.flush()?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).with_context(|| "atomic rename")?;
        Ok(())
    }

    fn transaction<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut Roster) -> Result<T, E>,
        E: From<anyhow::Error>,
    {
        let mut lock = self.lock_file()?;
        let _held = lock
            .write()
            .with_context(|| format!("locking {}", self.lock_path.display()))?;
        let mut work = self.load()?;
        let out = f(&mut work)?;
        self.save(&work)?;
        debug!(path = %self.path.display(), "transaction committed");
        Ok(out)
    }
}

/// Stockage en mémoire (tests, intégration dans un service hôte).
#[derive(Debug, Default)]
pub struct MemoryStorage {
    roster: Mutex<Roster>,
}

impl MemoryStorage {
    pub fn new(roster: Roster) -> Self {
        Self {
            roster: Mutex::new(roster),
        }
    }
}

impl Storage for MemoryStorage {
    fn load(&self) -> anyhow::Result<Roster> {
        let roster = self
            .roster
            .lock()
            .map_err(|_| anyhow::anyhow!("roster lock poisoned"))?;
        Ok(roster.clone())
    }

    fn save(&self, roster: &Roster) -> anyhow::Result<()> {
        let mut current = self
            .roster
            .lock()
            .map_err(|_| anyhow::anyhow!("roster lock poisoned"))?;
        *current = roster.clone();
        Ok(())
    }

    fn transaction<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut Roster) -> Result<T, E>,
        E: From<anyhow::Error>,
    {
        let mut current = self
            .roster
            .lock()
            .map_err(|_| anyhow::anyhow!("roster lock poisoned"))?;
        let mut work = current.clone();
        let out = f(&mut work)?;
        *current = work;
        Ok(out)
    }
}
