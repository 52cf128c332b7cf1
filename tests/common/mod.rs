//! Stub engine shared by the integration tests
//!
//! Index and search jobs are `DynObject`s registered in a "SearchEngine"
//! module that the runtime only loads on demand. Every created job is kept so
//! tests can inspect what the adapter wrote into it.

#![allow(dead_code)]

use fts_adapter::engine::{
    DynModule, DynObject, DynRuntime, DynType, EngineFault, ModuleRef, ObjectRef, TypeRef, Value, ValueKind,
};
use fts_adapter::AdapterConfig;
use parking_lot::Mutex;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub type JobLog = Arc<Mutex<Vec<Arc<DynObject>>>>;

/// What the stub index job does when executed
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum IndexBehavior {
    /// Writes `index.ix` into the index path and returns 0
    WritesMarker,
    /// Returns 0 without writing anything
    WritesNothing,
    /// Returns the given nonzero code
    FailsWith(i64),
}

/// How the stub search job accepts index paths
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum IndexAttach {
    /// `IndexesToSearch` collection object with `Add`
    Collection,
    /// `AddIndexToSearch(path)` method
    AddMethod,
    /// Only a single `IndexPath` property
    SingleProperty,
}

/// Shape of the results container the stub search job produces
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ResultShape {
    Enumerable,
    Counted,
    /// Counted, but `Count` is reported as a float
    CountedAsFloat,
}

#[derive(Debug, Clone)]
pub struct SearchJobSetup {
    pub attach: IndexAttach,
    pub shape: ResultShape,
    pub hits: usize,
    pub executable: bool,
    /// Expose the optional option properties (timeout, stemming, ...)
    pub option_props: bool,
    /// `GetItem` faults from this index on (counted shapes only)
    pub fault_at: Option<usize>,
    /// The job constructor panics instead of returning a job
    pub constructor_panics: bool,
}

impl Default for SearchJobSetup {
    fn default() -> Self {
        Self {
            attach: IndexAttach::Collection,
            shape: ResultShape::Enumerable,
            hits: 8,
            executable: true,
            option_props: true,
            fault_at: None,
            constructor_panics: false,
        }
    }
}

pub struct StubEngine {
    pub runtime: Arc<DynRuntime>,
    pub index_jobs: JobLog,
    pub search_jobs: JobLog,
}

impl StubEngine {
    pub fn new(index: IndexBehavior, search: SearchJobSetup) -> Self {
        let index_jobs: JobLog = Arc::default();
        let search_jobs: JobLog = Arc::default();

        let types: Vec<TypeRef> = vec![
            index_job_type(index, Arc::clone(&index_jobs)),
            search_job_type(search, Arc::clone(&search_jobs)),
        ];
        let module: ModuleRef = DynModule::new("SearchEngine", types);

        Self {
            runtime: DynRuntime::new(Vec::new(), vec![module]),
            index_jobs,
            search_jobs,
        }
    }

    pub fn indexing(index: IndexBehavior) -> Self {
        Self::new(index, SearchJobSetup::default())
    }

    pub fn searching(search: SearchJobSetup) -> Self {
        Self::new(IndexBehavior::WritesMarker, search)
    }

    pub fn last_index_job(&self) -> Arc<DynObject> {
        Arc::clone(self.index_jobs.lock().last().expect("no index job created"))
    }

    pub fn last_search_job(&self) -> Arc<DynObject> {
        Arc::clone(self.search_jobs.lock().last().expect("no search job created"))
    }
}

/// Config that keeps scratch files inside `scratch`
pub fn config_in(scratch: &Path) -> AdapterConfig {
    AdapterConfig {
        scratch_dir: scratch.to_path_buf(),
        ..AdapterConfig::default()
    }
}

/// Write `name` with some text under `dir`, creating parents
pub fn write_doc(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, format!("contents of {}", name)).unwrap();
    path
}

/// Files in `dir` whose names start with the file-list prefix
pub fn leftover_lists(dir: &Path) -> Vec<PathBuf> {
    fs::read_dir(dir)
        .unwrap()
        .flatten()
        .map(|e| e.path())
        .filter(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with("fts-filelist-"))
        })
        .collect()
}

pub fn str_of(job: &DynObject, name: &str) -> Option<String> {
    job.value_of(name).and_then(|v| v.as_str().map(str::to_string))
}

fn index_job_type(behavior: IndexBehavior, log: JobLog) -> TypeRef {
    DynType::new("SearchEngine.IndexJob", move || {
        let job = DynObject::builder("SearchEngine.IndexJob")
            .property("IndexPath", ValueKind::Str, Value::Null)
            .property("ToAddFileListName", ValueKind::Str, Value::Null)
            .property("ActionCreate", ValueKind::Bool, false)
            .property("ActionAdd", ValueKind::Bool, false)
            .property("ActionRemoveDeleted", ValueKind::Bool, false)
            .property("CreateRelativePaths", ValueKind::Bool, true)
            .property("TempFileDir", ValueKind::Str, Value::Null)
            .read_only("ListedFiles", ValueKind::StrList, Vec::<String>::new())
            .read_only("ListExistedDuringRun", ValueKind::Bool, false)
            .method("Execute", move |job, _| run_index_job(job, behavior))
            .build();
        log.lock().push(Arc::clone(&job));
        Ok(job as ObjectRef)
    })
}

fn run_index_job(job: &DynObject, behavior: IndexBehavior) -> Result<Value, EngineFault> {
    let index_path = str_of(job, "IndexPath").ok_or_else(|| EngineFault::new("IndexPath not set"))?;
    let list_path = str_of(job, "ToAddFileListName").ok_or_else(|| EngineFault::new("file list not set"))?;

    let listed = fs::read_to_string(&list_path).map_err(|e| EngineFault::new(e.to_string()))?;
    let listed: Vec<String> = listed.lines().map(str::to_string).collect();
    job.store("ListedFiles", Value::from(listed));
    job.store("ListExistedDuringRun", Value::Bool(true));

    match behavior {
        IndexBehavior::WritesMarker => {
            fs::write(Path::new(&index_path).join("index.ix"), b"ix").map_err(|e| EngineFault::new(e.to_string()))?;
            Ok(Value::Int(0))
        }
        IndexBehavior::WritesNothing => Ok(Value::Int(0)),
        IndexBehavior::FailsWith(code) => Ok(Value::Int(code)),
    }
}

fn search_job_type(setup: SearchJobSetup, log: JobLog) -> TypeRef {
    DynType::new("SearchEngine.SearchJob", move || {
        if setup.constructor_panics {
            panic!("ctor crashed");
        }
        let mut builder = DynObject::builder("SearchEngine.SearchJob")
            .property("Request", ValueKind::Str, Value::Null)
            .property("MaxFilesToRetrieve", ValueKind::Int, 0i64)
            .property("MaxContextBytes", ValueKind::Int, 0i64)
            .read_only("Results", ValueKind::Object, Value::Null);

        builder = match setup.attach {
            IndexAttach::Collection => {
                let collection = DynObject::builder("SearchEngine.StringCollection")
                    .read_only("Items", ValueKind::StrList, Vec::<String>::new())
                    .method("Add", |list, args| {
                        let mut items = match list.value_of("Items") {
                            Some(Value::List(items)) => items,
                            _ => Vec::new(),
                        };
                        items.extend(args.first().cloned());
                        list.store("Items", Value::List(items));
                        Ok(Value::Null)
                    })
                    .build();
                builder.read_only("IndexesToSearch", ValueKind::Object, collection as ObjectRef)
            }
            IndexAttach::AddMethod => builder
                .read_only("AttachedIndexes", ValueKind::StrList, Vec::<String>::new())
                .method("AddIndexToSearch", |job, args| {
                    let mut items = match job.value_of("AttachedIndexes") {
                        Some(Value::List(items)) => items,
                        _ => Vec::new(),
                    };
                    items.extend(args.first().cloned());
                    job.store("AttachedIndexes", Value::List(items));
                    Ok(Value::Null)
                }),
            IndexAttach::SingleProperty => builder.property("IndexPath", ValueKind::Str, Value::Null),
        };

        if setup.option_props {
            builder = builder
                .property("TimeoutMs", ValueKind::Int, 0i64)
                .property("Stemming", ValueKind::Bool, false)
                .property("CaseSensitive", ValueKind::Bool, false)
                .property("AccentSensitive", ValueKind::Bool, false)
                .property(
                    "SearchFlags",
                    ValueKind::Enum(vec!["None".into(), "Fuzzy".into(), "Phonic".into()]),
                    Value::Enum("None".into()),
                );
        }

        if setup.executable {
            let (shape, count, fault_at) = (setup.shape, setup.hits, setup.fault_at);
            builder = builder.method("Execute", move |job, _| {
                job.store("Results", Value::Object(results(shape, count, fault_at)));
                Ok(Value::Int(0))
            });
        }

        let job = builder.build();
        log.lock().push(Arc::clone(&job));
        Ok(job as ObjectRef)
    })
}

/// Hit `i` has score `100 - i` and lives at `/docs/doc{i}.txt`
pub fn hit(i: usize) -> ObjectRef {
    DynObject::builder("SearchEngine.SearchResultsItem")
        .read_only("Filename", ValueKind::Str, format!("/docs/doc{}.txt", i))
        .read_only("PageNumber", ValueKind::Int, (i + 1) as i64)
        .read_only("Context", ValueKind::Str, format!("match {}\r\nin context", i))
        .read_only("Score", ValueKind::Float, 100.0 - i as f64)
        .read_only("HitCount", ValueKind::Int, (i * 2) as i64)
        .build()
}

fn results(shape: ResultShape, count: usize, fault_at: Option<usize>) -> ObjectRef {
    let hits: Vec<Value> = (0..count).map(|i| Value::Object(hit(i))).collect();
    let count_value = match shape {
        ResultShape::Enumerable => {
            return DynObject::builder("SearchEngine.SearchResults").items(hits).build();
        }
        ResultShape::Counted => Value::Int(count as i64),
        ResultShape::CountedAsFloat => Value::Float(count as f64),
    };
    let count_kind = match count_value {
        Value::Float(_) => ValueKind::Float,
        _ => ValueKind::Int,
    };

    DynObject::builder("SearchEngine.SearchResults")
        .read_only("Count", count_kind, count_value)
        .method("GetItem", move |_, args| {
            let index = args.first().and_then(|v| v.as_int()).unwrap_or(-1);
            if let Some(at) = fault_at.filter(|at| usize::try_from(index).is_ok_and(|i| i >= *at)) {
                return Err(EngineFault::new(format!("result store unavailable past item {}", at)));
            }
            usize::try_from(index)
                .ok()
                .and_then(|i| hits.get(i).cloned())
                .ok_or_else(|| EngineFault::new(format!("index {} out of range", index)))
        })
        .build()
}
