use crate::device::backing_store::BackingStore;
use bytes::Bytes;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultKind {
    ReadFailure,
    WriteFailure,
    /// Only the first `valid_bytes` of the write reach the medium; the write
    /// is reported as failed.
    TornWrite { valid_bytes: usize },
}

impl FaultKind {
    fn on_write(self) -> bool {
        !matches!(self, FaultKind::ReadFailure)
    }
}

/// One injection rule: which fault, how many matching requests to let through
/// first, and how many times to fire (forever when `times` is `None`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FaultSpec {
    kind: FaultKind,
    skip: usize,
    times: Option<usize>,
}

impl FaultSpec {
    pub fn read_failure() -> Self {
        Self::new(FaultKind::ReadFailure)
    }

    pub fn write_failure() -> Self {
        Self::new(FaultKind::WriteFailure)
    }

    pub fn torn_write(valid_bytes: usize) -> Self {
        Self::new(FaultKind::TornWrite { valid_bytes })
    }

    fn new(kind: FaultKind) -> Self {
        Self {
            kind,
            skip: 0,
            times: None,
        }
    }

    pub fn after(mut self, n: usize) -> Self {
        self.skip = n;
        self
    }

    pub fn times(mut self, n: usize) -> Self {
        self.times = Some(n);
        self
    }

    pub fn kind(&self) -> FaultKind {
        self.kind
    }
}

#[derive(Debug)]
struct Armed {
    spec: FaultSpec,
    seen: usize,
    fired: usize,
}

impl Armed {
    fn fires(&mut self) -> bool {
        self.seen += 1;
        if self.seen <= self.spec.skip {
            return false;
        }
        if self.spec.times.is_some_and(|t| self.fired >= t) {
            return false;
        }
        self.fired += 1;
        true
    }
}

pub struct FaultyDevice<B> {
    inner: B,
    faults: Vec<Armed>,
    reads: usize,
    writes: usize,
    injected: usize,
}

impl<B: BackingStore> FaultyDevice<B> {
    pub fn new(inner: B) -> Self {
        Self {
            inner,
            faults: Vec::new(),
            reads: 0,
            writes: 0,
            injected: 0,
        }
    }

    pub fn inject(&mut self, spec: FaultSpec) {
        self.faults.push(Armed {
            spec,
            seen: 0,
            fired: 0,
        });
    }

    pub fn with_fault(mut self, spec: FaultSpec) -> Self {
        self.inject(spec);
        self
    }

    pub fn clear_faults(&mut self) {
        self.faults.clear();
    }

    /// Overwrites bytes on the inner device, bypassing every rule.
    pub fn corrupt(&mut self, offset: u64, data: &[u8]) -> bool {
        self.inner.write(offset, data)
    }

    pub fn reads(&self) -> usize {
        self.reads
    }

    pub fn writes(&self) -> usize {
        self.writes
    }

    pub fn injected(&self) -> usize {
        self.injected
    }

    pub fn inner(&self) -> &B {
        &self.inner
    }

    pub fn inner_mut(&mut self) -> &mut B {
        &mut self.inner
    }

    pub fn into_inner(self) -> B {
        self.inner
    }

    fn next_fault(&mut self, write: bool) -> Option<FaultKind> {
        let kind = self
            .faults
            .iter_mut()
            .filter(|a| a.spec.kind.on_write() == write)
            .find_map(|a| a.fires().then_some(a.spec.kind))?;
        self.injected += 1;
        Some(kind)
    }
}

impl<B: BackingStore> BackingStore for FaultyDevice<B> {
    fn read(&mut self, offset: u64, len: usize) -> Option<Bytes> {
        self.reads += 1;
        if let Some(kind) = self.next_fault(false) {
            debug!(offset, len, ?kind, "injected read fault");
            return None;
        }
        self.inner.read(offset, len)
    }

    fn write(&mut self, offset: u64, data: &[u8]) -> bool {
        self.writes += 1;
        match self.next_fault(true) {
            None => self.inner.write(offset, data),
            Some(kind) => {
                debug!(offset, len = data.len(), ?kind, "injected write fault");
                if let FaultKind::TornWrite { valid_bytes } = kind {
                    let n = valid_bytes.min(data.len());
                    self.inner.write(offset, &data[..n]);
                }
                false
            }
        }
    }

    fn size(&self) -> u64 {
        self.inner.size()
    }
}
