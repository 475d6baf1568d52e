//! Server proposal orchestration
//!
//! Sequences fact extraction, rule evaluation and reconciliation for one
//! tenant document. A [`ProposalService`] holds one snapshot of the catalogs;
//! proposing is a pure function of that snapshot and the document.

use crate::models::{
    BrandCatalog, DeploymentMode, Disk, Intent, Overrides, Proposal, Rule, Server, ServerDefault,
    TenantDocument, DEFAULT_INTEGRATIONS,
};
use crate::services::catalog::CatalogProvider;
use crate::services::facts::FactExtractor;
use crate::services::reconciler::{TopologyReconciler, BASELINE_FALLBACK_SIZE};
use crate::services::roles::{self, CX, DB, SCALE, SINGLETON_ROLES};
use crate::services::rules::RuleEvaluator;
use crate::utils::CatalogError;

/// Drives of the baseline server on a new tenant when the catalog has no layout
const DRAFT_BASELINE_DRIVES: [&str; 3] = ["C", "D", "F"];

/// Proposal engine bound to one catalog snapshot
pub struct ProposalService {
    evaluator: RuleEvaluator,
    defaults: Vec<ServerDefault>,
    brands: BrandCatalog,
}

impl ProposalService {
    pub fn new(rules: &[Rule], defaults: Vec<ServerDefault>, brands: BrandCatalog) -> Self {
        Self {
            evaluator: RuleEvaluator::new(rules),
            defaults,
            brands,
        }
    }

    /// Fetch a catalog snapshot.
    ///
    /// A rule catalog failure is fatal; server defaults and brands degrade to
    /// empty catalogs.
    pub async fn load(provider: &dyn CatalogProvider) -> Result<Self, CatalogError> {
        let rules = provider.rules().await?;

        let defaults = provider.server_defaults().await.unwrap_or_else(|e| {
            tracing::warn!("Server defaults unavailable, using fallbacks: {}", e);
            Vec::new()
        });

        let brands = provider.brands().await.unwrap_or_else(|e| {
            tracing::warn!("Brand catalog unavailable, brand ids used as labels: {}", e);
            Vec::new()
        });

        tracing::debug!(
            "Loaded catalogs: {} rules, {} server defaults, {} brands",
            rules.len(),
            defaults.len(),
            brands.len()
        );

        Ok(Self::new(&rules, defaults, BrandCatalog::new(brands)))
    }

    /// Number of rules that compiled and take part in evaluation
    pub fn rule_count(&self) -> usize {
        self.evaluator.len()
    }

    pub fn defaults(&self) -> &[ServerDefault] {
        &self.defaults
    }

    pub fn brands(&self) -> &BrandCatalog {
        &self.brands
    }

    /// Compute the server topology for a tenant document
    pub fn propose(&self, document: &TenantDocument, mode: DeploymentMode) -> Proposal {
        let facts = FactExtractor::new(&self.brands).extract(
            &document.companies,
            &document.infrastructure.integrations,
            mode,
        );
        let intents = self.evaluator.evaluate(&facts);
        let reconciler = TopologyReconciler::new(document.servers(), &self.defaults);

        let mut server_list = reconciler.baseline();

        if let Some(intent) = first_intent(&intents, SCALE) {
            server_list.extend(reconciler.expand_scale(
                facts.scale_required,
                facts.scale_recommended,
                &intent.overrides,
            ));
        }

        if let Some(intent) = first_intent(&intents, CX) {
            server_list.extend(reconciler.expand_composite(
                &document.companies,
                &self.brands,
                &intent.overrides,
            ));
        }

        for role in SINGLETON_ROLES {
            if let Some(intent) = first_intent(&intents, role) {
                server_list.push(reconciler.reconcile(role, &intent.overrides));
            }
        }

        for intent in &intents {
            let base = roles::base_role(&intent.role);
            let handled = base == SCALE || base == CX || SINGLETON_ROLES.iter().any(|r| *r == base);
            if !handled {
                tracing::debug!(
                    "Rule '{}' requested role '{}' which is not proposed",
                    intent.rule,
                    intent.role
                );
            }
        }

        let server_hint = roles::server_hint(&server_list);

        tracing::info!(
            "Proposed {} servers ({}) for tenant '{}' in {} mode",
            server_list.len(),
            server_hint,
            document.tenant_name,
            mode.as_str()
        );

        Proposal {
            server_list,
            server_hint,
            has_network_appliance: facts.needs_network_appliance,
            has_vlan_segmentation: facts.needs_vlan,
            has_proxy: facts.needs_proxy,
            facts,
        }
    }

    /// Fetch catalogs from a provider and propose in one step
    pub async fn propose_with(
        provider: &dyn CatalogProvider,
        document: &TenantDocument,
        mode: DeploymentMode,
    ) -> Result<Proposal, CatalogError> {
        let service = Self::load(provider).await?;
        Ok(service.propose(document, mode))
    }
}

/// First intent (in rule order) for a base role
fn first_intent<'a>(intents: &'a [Intent], base: &str) -> Option<&'a Intent> {
    intents.iter().find(|i| roles::base_role(&i.role) == base)
}

impl TenantDocument {
    /// A new tenant with one empty company, the default integrations and a baseline server
    pub fn draft(defaults: &[ServerDefault]) -> Self {
        let mut document = TenantDocument::with_companies(vec![Default::default()])
            .with_integrations(DEFAULT_INTEGRATIONS);

        let mut baseline = TopologyReconciler::new(&[], defaults)
            .reconcile(DB, &Overrides::default());
        let has_db_layout = defaults
            .iter()
            .any(|d| d.role == DB && !d.default_disk_list.is_empty());
        if !has_db_layout {
            baseline.disk_list = DRAFT_BASELINE_DRIVES
                .iter()
                .map(|letter| Disk::new(*letter, BASELINE_FALLBACK_SIZE))
                .collect();
        }

        document.infrastructure.server_list = vec![baseline];
        document.prepare_for_save();
        document
    }

    /// Add a baseline server to a loaded document that has none
    pub fn ensure_baseline(&mut self, defaults: &[ServerDefault]) {
        if self.servers().iter().any(|s| s.role == DB) {
            return;
        }
        let baseline = TopologyReconciler::new(&[], defaults).reconcile(DB, &Overrides::default());
        self.infrastructure.server_list.insert(0, baseline);
    }

    /// Write a proposal back into the document
    pub fn apply_proposal(&mut self, proposal: &Proposal) {
        self.infrastructure.server_list = proposal.server_list.clone();
        self.infrastructure.server_hint = proposal.server_hint.clone();
        self.infrastructure.has_network_appliance = proposal.has_network_appliance;
        self.infrastructure.has_vlan_segmentation = proposal.has_vlan_segmentation;
    }

    /// Refresh derived fields before the document is handed to the store
    pub fn prepare_for_save(&mut self) {
        self.infrastructure.server_hint = roles::server_hint(&self.infrastructure.server_list);
    }

    /// Servers displayed to the user
    pub fn displayed_servers(&self, include_recommended: bool) -> Vec<Server> {
        roles::displayed_servers(self.servers(), include_recommended)
    }
}
