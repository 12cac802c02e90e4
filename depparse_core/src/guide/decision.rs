//! Decisions: the integer codes a classifier sees in place of a transition

use super::error::{GuideError, GuideResult};
use super::settings::{DecisionSettings, RelationToNextDecision};
use crate::config::constants::decision::COMBINED_SEPARATOR;
use crate::symbols::{NullValueId, SymbolTableHandler, TableCategory, ValueType};
use crate::transition::{Transition, TransitionKind, TransitionTable};

// ============================================================================
// K-BEST LIST
// ============================================================================

/// Ranked alternatives for one decision, consumed front to back
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KBestList {
    k: Option<usize>,
    candidates: Vec<i32>,
    cursor: usize,
}

impl KBestList {
    /// `k == -1` keeps the whole ranking
    pub fn new(k: i32) -> Self {
        Self {
            k: usize::try_from(k).ok().filter(|&k| k > 0),
            candidates: Vec::new(),
            cursor: 0,
        }
    }

    pub fn k(&self) -> Option<usize> {
        self.k
    }

    /// Replace the list with a fresh ranking, truncated to `k`
    pub fn add_list(&mut self, ranked: &[i32]) {
        let keep = self.k.map_or(ranked.len(), |k| k.min(ranked.len()));
        self.candidates.clear();
        self.candidates.extend_from_slice(&ranked[..keep]);
        self.cursor = 0;
    }

    /// Next unused candidate
    pub fn next(&mut self) -> Option<i32> {
        let code = self.candidates.get(self.cursor).copied();
        if code.is_some() {
            self.cursor += 1;
        }
        code
    }

    pub fn candidates(&self) -> &[i32] {
        &self.candidates
    }

    pub fn is_exhausted(&self) -> bool {
        self.cursor >= self.candidates.len()
    }

    pub fn reset(&mut self) {
        self.candidates.clear();
        self.cursor = 0;
    }
}

// ============================================================================
// DECISIONS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SingleDecision {
    code: Option<i32>,
    kbest: KBestList,
}

impl SingleDecision {
    pub fn new(k: i32) -> Self {
        Self {
            code: None,
            kbest: KBestList::new(k),
        }
    }

    pub fn code(&self) -> Option<i32> {
        self.code
    }

    pub fn set_code(&mut self, code: i32) {
        self.code = Some(code);
    }

    pub fn kbest(&self) -> &KBestList {
        &self.kbest
    }

    /// Take a ranking from the classifier; the best candidate becomes the code
    pub fn add_ranked(&mut self, ranked: &[i32]) {
        self.kbest.add_list(ranked);
        self.code = self.kbest.next();
    }

    /// Move to the next candidate; `false` when none is left
    pub fn update_from_kbest(&mut self) -> bool {
        match self.kbest.next() {
            Some(code) => {
                self.code = Some(code);
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.code = None;
        self.kbest.reset();
    }
}

/// One or two single decisions making up a transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComplexDecision {
    first: SingleDecision,
    second: Option<SingleDecision>,
}

impl ComplexDecision {
    pub fn new(k: i32) -> Self {
        Self {
            first: SingleDecision::new(k),
            second: None,
        }
    }

    pub fn first(&self) -> &SingleDecision {
        &self.first
    }

    pub fn first_mut(&mut self) -> &mut SingleDecision {
        &mut self.first
    }

    pub fn second(&self) -> Option<&SingleDecision> {
        self.second.as_ref()
    }

    /// The second decision, created on first use with the same `k`
    pub fn second_mut(&mut self) -> &mut SingleDecision {
        let k = self.first.kbest.k.map_or(-1, |k| k as i32);
        self.second.get_or_insert_with(|| SingleDecision::new(k))
    }

    pub fn second_if_present_mut(&mut self) -> Option<&mut SingleDecision> {
        self.second.as_mut()
    }

    pub fn drop_second(&mut self) {
        self.second = None;
    }

    pub fn codes(&self) -> (Option<i32>, Option<i32>) {
        (self.first.code, self.second.as_ref().and_then(|s| s.code))
    }

    pub fn clear(&mut self) {
        self.first.clear();
        self.second = None;
    }
}

// ============================================================================
// ACTION MAPPER
// ============================================================================

/// Converts transitions to decisions and back for one decision setting
#[derive(Debug, Clone)]
pub struct ActionMapper {
    settings: DecisionSettings,
    table: TransitionTable,
    /// Label given to arcs when the settings carry no label decision
    default_label: i32,
}

impl ActionMapper {
    pub fn new(settings: DecisionSettings, table: TransitionTable, default_label: i32) -> Self {
        Self {
            settings,
            table,
            default_label,
        }
    }

    pub fn settings(&self) -> &DecisionSettings {
        &self.settings
    }

    pub fn transition_table(&self) -> &TransitionTable {
        &self.table
    }

    /// Declare the tables the decisions are coded in
    pub fn declare_tables(&self, symbols: &mut dyn SymbolTableHandler) -> GuideResult<()> {
        if let Some(column) = self.settings.label_column() {
            symbols.add_symbol_table(column, TableCategory::Output, ValueType::String)?;
        }
        if let Some(table) = self.settings.combined_table() {
            symbols.add_symbol_table(&table, TableCategory::Output, ValueType::String)?;
        }
        Ok(())
    }

    /// Encode the transition, registering new combined symbols
    pub fn encode(
        &self,
        transition: Transition,
        symbols: &mut dyn SymbolTableHandler,
        decision: &mut ComplexDecision,
    ) -> GuideResult<()> {
        decision.clear();

        if let (Some(table), Some(column)) = (self.settings.combined_table(), self.settings.label_column()) {
            let symbol = match transition.label {
                Some(label) if transition.kind.is_arc() => format!(
                    "{}{}{}",
                    transition.kind.symbol(),
                    COMBINED_SEPARATOR,
                    symbols.require_symbol(column, label)?
                ),
                _ => transition.kind.symbol().to_string(),
            };
            let code = symbols.add_symbol(&table, &symbol)?;
            decision.first_mut().set_code(code);
            return Ok(());
        }

        decision.first_mut().set_code(self.table.code(transition.kind)?);
        if self.settings.is_labeled() && transition.kind.is_arc() {
            let label = transition
                .label
                .ok_or_else(|| GuideError::malformed(format!("{} carries no label", transition)))?;
            decision.second_mut().set_code(label);
        }
        Ok(())
    }

    /// Whether `first` needs a label decision after it
    pub fn needs_label(&self, first: i32) -> GuideResult<bool> {
        if !self.settings.is_labeled() || self.settings.relation() == RelationToNextDecision::None {
            return Ok(false);
        }
        Ok(self.table.kind(first)?.is_arc())
    }

    pub fn kind(&self, first: i32) -> GuideResult<TransitionKind> {
        Ok(self.table.kind(first)?)
    }

    pub fn decode(
        &self,
        decision: &ComplexDecision,
        symbols: &dyn SymbolTableHandler,
    ) -> GuideResult<Transition> {
        let (first, second) = decision.codes();
        let first = first.ok_or_else(|| GuideError::malformed("no transition code predicted"))?;

        if let (Some(table), Some(column)) = (self.settings.combined_table(), self.settings.label_column()) {
            let symbol = symbols
                .code_to_symbol(&table, first)?
                .ok_or_else(|| GuideError::malformed(format!("unknown combined code {}", first)))?
                .to_string();
            let (kind_symbol, label_symbol) = match symbol.split_once(COMBINED_SEPARATOR) {
                Some((kind, label)) => (kind, Some(label)),
                None => (symbol.as_str(), None),
            };
            let kind = self
                .table
                .kind_for_symbol(kind_symbol)
                .map_err(|e| GuideError::malformed(e.to_string()))?;
            return match (kind.is_arc(), label_symbol) {
                (false, None) => Ok(Transition::new(kind)),
                (true, Some(label)) => Ok(Transition::labeled(kind, symbols.require_code(column, label)?)),
                _ => Err(GuideError::malformed(format!("combined symbol '{}' does not fit its transition", symbol))),
            };
        }

        let kind = self
            .table
            .kind(first)
            .map_err(|e| GuideError::malformed(e.to_string()))?;
        if !kind.is_arc() {
            return Ok(Transition::new(kind));
        }
        let Some(column) = self.settings.label_column() else {
            return Ok(Transition::labeled(kind, self.default_label));
        };
        let label = second.ok_or_else(|| GuideError::malformed(format!("{} predicted without a label", kind)))?;
        for id in [NullValueId::NoNode, NullValueId::RootNode, NullValueId::NoValue] {
            if symbols.null_code(column, id)? == label {
                return Err(GuideError::malformed("a null code is not an arc label"));
            }
        }
        if symbols.code_to_symbol(column, label)?.is_none() {
            return Err(GuideError::malformed(format!("unknown label code {}", label)));
        }
        Ok(Transition::labeled(kind, label))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbols::{HashSymbolTableHandler, NullValueStrategy};
    use assert_matches::assert_matches;

    fn table() -> TransitionTable {
        use TransitionKind::*;
        TransitionTable::new("nivreeager", &[Shift, Reduce, RightArc, LeftArc])
    }

    fn symbols() -> (HashSymbolTableHandler, i32) {
        let mut symbols = HashSymbolTableHandler::new(NullValueStrategy::One);
        symbols
            .add_symbol_table("DEPREL", TableCategory::Output, ValueType::String)
            .unwrap();
        let sbj = symbols.add_symbol("DEPREL", "SBJ").unwrap();
        (symbols, sbj)
    }

    #[test]
    fn test_kbest_truncation_and_exhaustion() {
        let mut list = KBestList::new(2);
        list.add_list(&[7, 3, 9]);
        assert_eq!(list.candidates(), &[7, 3]);
        assert_eq!(list.next(), Some(7));
        assert_eq!(list.next(), Some(3));
        assert!(list.is_exhausted());
        assert_eq!(list.next(), None);

        let mut all = KBestList::new(-1);
        all.add_list(&[1, 2, 3]);
        assert_eq!(all.candidates().len(), 3);
    }

    #[test]
    fn test_single_decision_walks_the_ranking() {
        let mut decision = SingleDecision::new(-1);
        decision.add_ranked(&[4, 1]);
        assert_eq!(decision.code(), Some(4));
        assert!(decision.update_from_kbest());
        assert_eq!(decision.code(), Some(1));
        assert!(!decision.update_from_kbest());
    }

    #[test]
    fn test_combined_round_trip() {
        let (mut symbols, sbj) = symbols();
        let settings = DecisionSettings::parse("T.TRANS+A.DEPREL").unwrap();
        let mapper = ActionMapper::new(settings, table(), sbj);
        mapper.declare_tables(&mut symbols).unwrap();

        let mut decision = ComplexDecision::new(-1);
        let transition = Transition::labeled(TransitionKind::LeftArc, sbj);
        mapper.encode(transition, &mut symbols, &mut decision).unwrap();
        assert!(decision.second().is_none());
        assert_eq!(
            symbols.code_to_symbol("T.TRANS+A.DEPREL", decision.codes().0.unwrap()).unwrap(),
            Some("LA~SBJ")
        );
        assert_eq!(mapper.decode(&decision, &symbols).unwrap(), transition);

        mapper.encode(Transition::shift(), &mut symbols, &mut decision).unwrap();
        assert_eq!(mapper.decode(&decision, &symbols).unwrap(), Transition::shift());
    }

    #[test]
    fn test_sequential_codes() {
        let (mut symbols, sbj) = symbols();
        let mapper = ActionMapper::new(DecisionSettings::parse("T.TRANS,A.DEPREL").unwrap(), table(), sbj);

        let mut decision = ComplexDecision::new(-1);
        mapper
            .encode(Transition::labeled(TransitionKind::RightArc, sbj), &mut symbols, &mut decision)
            .unwrap();
        assert_eq!(decision.codes(), (Some(3), Some(sbj)));
        assert!(mapper.needs_label(3).unwrap());
        assert!(!mapper.needs_label(1).unwrap());

        // a null label is never a usable prediction
        decision.second_mut().set_code(0);
        assert_matches!(
            mapper.decode(&decision, &symbols),
            Err(GuideError::MalformedDecision { .. })
        );
    }

    #[test]
    fn test_unlabeled_arcs_take_the_default_label() {
        let (symbols, sbj) = symbols();
        let mapper = ActionMapper::new(DecisionSettings::parse("T.TRANS").unwrap(), table(), sbj);
        let mut decision = ComplexDecision::new(-1);
        decision.first_mut().set_code(4);
        assert_eq!(
            mapper.decode(&decision, &symbols).unwrap(),
            Transition::labeled(TransitionKind::LeftArc, sbj)
        );

        decision.first_mut().set_code(99);
        assert_matches!(
            mapper.decode(&decision, &symbols),
            Err(GuideError::MalformedDecision { .. })
        );
    }
}
