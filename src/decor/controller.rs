//! Update controller
//!
//! Owns the per-document decoration state and decides, for each host event,
//! what to rebuild and what to re-scan. Events run to completion one at a
//! time; nothing here is shared between documents.

use std::collections::HashMap;
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::atomic::AtomicBool;

use tracing::{debug, trace};

use super::host::{DecorationHost, DocumentId, StyleHandle, TextDocument};
use super::index::{DecorationIndex, SetSpans};
use super::paths::{applicable_rules, relative_path};
use super::pattern::{Matcher, PatternCache};
use super::resolve::resolve;
use super::scan::{scan, BoundStyle, LineFilter, LineScope, ScanOptions};
use super::span::{Position, Span};
use super::style::{GroupId, StyleRecord};
use crate::config::{LineSelector, Rule, Settings};

/// Lifecycle of a document's decoration state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No bindings; waiting to become visible
    Unconfigured,
    /// Bindings and style handles built, nothing drawn yet
    Configured,
    /// Spans applied to the view
    Scanned,
}

/// Answer to a hover query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HoverInfo {
    pub group: GroupId,
    pub description: Option<String>,
    pub span: Span,
}

/// A pattern and the styles bound to its capture groups
#[derive(Debug)]
struct PatternBinding {
    matcher: Rc<Matcher>,
    options: ScanOptions,
    groups: Vec<(GroupId, Rc<BoundStyle>)>,
}

/// Decoration state of one document
#[derive(Debug)]
struct DocumentState {
    phase: Phase,
    /// Bindings in first-declared order
    bindings: Vec<PatternBinding>,
    /// Pattern text -> position in `bindings`
    by_pattern: HashMap<String, usize>,
    /// Every handle this document acquired, in acquisition order
    handles: Vec<StyleHandle>,
    index: DecorationIndex,
}

impl DocumentState {
    fn new() -> Self {
        Self {
            phase: Phase::Unconfigured,
            bindings: Vec::new(),
            by_pattern: HashMap::new(),
            handles: Vec::new(),
            index: DecorationIndex::new(),
        }
    }

    /// Clear every span from the view, then give the handles back
    fn release<H: DecorationHost>(&mut self, host: &mut H, document: DocumentId) {
        for handle in &self.handles {
            host.set_spans(document, *handle, &[]);
        }
        for handle in self.handles.drain(..) {
            host.dispose_style(handle);
        }
        self.bindings.clear();
        self.by_pattern.clear();
        self.index.clear();
        self.phase = Phase::Unconfigured;
    }
}

/// Drives decoration of every open document
pub struct Controller<H: DecorationHost> {
    host: H,
    settings: Settings,
    patterns: PatternCache,
    documents: HashMap<DocumentId, DocumentState>,
    workspace_root: Option<PathBuf>,
}

impl<H: DecorationHost> Controller<H> {
    /// Create a controller; nothing is decorated until documents are shown
    pub fn new(host: H, settings: Settings) -> Self {
        Self {
            host,
            settings,
            patterns: PatternCache::new(),
            documents: HashMap::new(),
            workspace_root: None,
        }
    }

    /// Builder: make document paths relative to `root` before path filtering
    pub fn with_workspace_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.workspace_root = Some(root.into());
        self
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    /// Current phase of a document, if it is known
    pub fn phase(&self, document: DocumentId) -> Option<Phase> {
        self.documents.get(&document).map(|state| state.phase)
    }

    /// Decorations from the document's latest scan
    pub fn decorations(&self, document: DocumentId) -> Option<&DecorationIndex> {
        self.documents.get(&document).map(|state| &state.index)
    }

    /// Configuration changed: drop all bindings, rebuild, re-scan `visible`
    pub fn on_configuration_changed<D>(&mut self, settings: Settings, visible: &[&D])
    where
        D: TextDocument + ?Sized,
    {
        for (id, state) in self.documents.iter_mut() {
            state.release(&mut self.host, *id);
        }
        self.settings = settings;
        debug!(
            configurations = self.settings.configurations.len(),
            styles = self.settings.styles.len(),
            documents = visible.len(),
            "configuration changed"
        );

        for document in visible {
            self.configure(*document);
            self.scan_document(*document);
        }
    }

    /// Documents became visible: configure if needed, then scan
    pub fn on_documents_visible<D>(&mut self, documents: &[&D])
    where
        D: TextDocument + ?Sized,
    {
        for document in documents {
            let phase = self.phase(document.id()).unwrap_or(Phase::Unconfigured);
            if phase == Phase::Unconfigured {
                self.configure(*document);
            }
            self.scan_document(*document);
        }
    }

    /// Document was saved: re-scan it if it has bindings
    pub fn on_document_saved<D>(&mut self, document: &D)
    where
        D: TextDocument + ?Sized,
    {
        self.rescan(document);
    }

    /// Document content changed: re-scan it if it has bindings
    pub fn on_document_changed<D>(&mut self, document: &D)
    where
        D: TextDocument + ?Sized,
    {
        self.rescan(document);
    }

    /// Document closed: clear its spans and release its style handles
    pub fn on_document_closed(&mut self, document: DocumentId) {
        if let Some(mut state) = self.documents.remove(&document) {
            state.release(&mut self.host, document);
            debug!(document = document.0, "released document");
        }
    }

    /// Release every document's state
    pub fn shutdown(&mut self) {
        for (id, mut state) in self.documents.drain() {
            state.release(&mut self.host, id);
        }
    }

    /// What decorates `position`, using the latest scan
    ///
    /// Returns `None` once `cancel` is set.
    pub fn hover(&self, document: DocumentId, position: Position, cancel: &AtomicBool) -> Option<HoverInfo> {
        let state = self.documents.get(&document)?;
        state
            .index
            .lookup(position, cancel)
            .map(|decoration| HoverInfo {
                group: decoration.group.clone(),
                description: decoration.style.record.description.clone(),
                span: decoration.span,
            })
    }

    fn rescan<D>(&mut self, document: &D)
    where
        D: TextDocument + ?Sized,
    {
        match self.phase(document.id()) {
            Some(Phase::Configured) | Some(Phase::Scanned) => self.scan_document(document),
            _ => trace!(document = document.id().0, "ignoring event for unconfigured document"),
        }
    }

    /// Build bindings and acquire style handles for a document
    fn configure<D>(&mut self, document: &D)
    where
        D: TextDocument + ?Sized,
    {
        let id = document.id();
        let mut state = self.documents.remove(&id).unwrap_or_else(DocumentState::new);
        state.release(&mut self.host, id);

        let relative = relative_path(document.path(), self.workspace_root.as_deref());
        let rules = applicable_rules(&self.settings.configurations, &relative);

        for rule in rules {
            let records = resolve(&rule.decorations, &self.settings.styles);
            if records.is_empty() {
                continue;
            }
            for pattern in &rule.patterns {
                bind_pattern(&mut self.patterns, &mut self.host, &mut state, rule, pattern, &records);
            }
        }

        state.phase = Phase::Configured;
        debug!(
            document = id.0,
            path = %relative,
            patterns = state.bindings.len(),
            handles = state.handles.len(),
            "configured document"
        );
        self.documents.insert(id, state);
    }

    /// Scan every binding and apply the result to the view
    fn scan_document<D>(&mut self, document: &D)
    where
        D: TextDocument + ?Sized,
    {
        let id = document.id();
        let Some(state) = self.documents.get_mut(&id) else {
            return;
        };

        let mut decorations = Vec::new();
        for binding in &state.bindings {
            decorations.extend(scan(document, &binding.options, &binding.matcher, &binding.groups));
        }
        state.index.rebuild(decorations);

        for SetSpans { handle, spans } in state.index.instructions(&state.handles) {
            self.host.set_spans(id, handle, &spans);
        }
        state.phase = Phase::Scanned;
        debug!(document = id.0, spans = state.index.len(), "scanned document");
    }
}

/// Bind a rule's styles to one of its patterns
///
/// The first rule to declare a pattern fixes how it is compiled and scanned;
/// later rules add groups or take over existing ones.
fn bind_pattern<H: DecorationHost>(
    patterns: &mut PatternCache,
    host: &mut H,
    state: &mut DocumentState,
    rule: &Rule,
    pattern: &str,
    records: &[StyleRecord],
) {
    let idx = match state.by_pattern.get(pattern) {
        Some(idx) => *idx,
        None => {
            let multiline = rule.lines.is_empty() && !rule.exhaustive;
            let Some(matcher) = patterns.get_or_compile(pattern, rule.match_case, multiline) else {
                return;
            };
            state.bindings.push(PatternBinding {
                matcher,
                options: ScanOptions {
                    scope: line_scope(patterns, rule),
                    exhaustive: rule.exhaustive,
                },
                groups: Vec::new(),
            });
            state.by_pattern.insert(pattern.to_string(), state.bindings.len() - 1);
            state.bindings.len() - 1
        }
    };

    let binding = &mut state.bindings[idx];
    for record in records {
        let handle = host.create_style(record);
        state.handles.push(handle);
        let bound = Rc::new(BoundStyle {
            record: record.clone(),
            handle,
        });

        for group in &record.groups {
            match binding.groups.iter_mut().find(|(existing, _)| existing == group) {
                Some(slot) => slot.1 = Rc::clone(&bound),
                None => binding.groups.push((group.clone(), Rc::clone(&bound))),
            }
        }
    }
}

/// Compile a rule's line selectors; bad selector patterns are skipped
fn line_scope(patterns: &mut PatternCache, rule: &Rule) -> LineScope {
    if rule.lines.is_empty() {
        return LineScope::Document;
    }

    let filters = rule
        .lines
        .iter()
        .filter_map(|selector| match selector {
            LineSelector::Line(line) => Some(LineFilter::Line(line.saturating_sub(1))),
            LineSelector::Range(start, end) => {
                Some(LineFilter::Range(start.saturating_sub(1), end.saturating_sub(1)))
            }
            LineSelector::Pattern(pattern) => patterns
                .get_or_compile(pattern, rule.match_case, false)
                .map(LineFilter::Pattern),
        })
        .collect();
    LineScope::Lines(filters)
}
