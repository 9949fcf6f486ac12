//! Reconciliation controller.

use super::{Action, Bundle, Part, RouterError, Status};
use crate::artifact::{ArtifactError, TempArtifact};
use crate::cli::{CliOutput, ClusterClient};
use crate::compare::{equal_under_skip, SkipKeys};
use crate::config::{RouterConfig, State};
use crate::document::Document;
use crate::resource::{DeploymentConfig, ManagedResource, ResourceKind};
use crate::value::Value;
use std::thread;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Default wait between deleting and recreating the parts of a drifted router.
pub const DEFAULT_SETTLE: Duration = Duration::from_secs(15);

/// Service account fields filled in by the token controllers.
pub const SERVICE_ACCOUNT_SKIP: [&str; 2] = ["secrets", "imagePullSecrets"];

/// Service fields allocated by the cluster.
pub const SERVICE_SKIP: [&str; 4] = ["portalIP", "clusterIP", "sessionAffinity", "type"];

/// Deployment config fields defaulted differently by the dry-run and the
/// cluster.
pub const DEPLOYMENT_SKIP: [&str; 9] = [
    "dnsPolicy",
    "terminationGracePeriodSeconds",
    "restartPolicy",
    "timeoutSeconds",
    "livenessProbe",
    "readinessProbe",
    "terminationMessagePath",
    "hostPort",
    "defaultMode",
];

const STATS_PASSWORD: &str = "STATS_PASSWORD";
const ALREADY_EXISTS: &str = "already exist";
const NOT_FOUND: &str = "not found";

/// Router reconciles one router bundle against the cluster.
#[derive(Debug)]
pub struct Router<C> {
    config: RouterConfig,
    client: C,
    settle: Duration,
    check_mode: bool,
}

impl<C: ClusterClient> Router<C> {
    pub fn new(config: RouterConfig, client: C) -> Self {
        Router {
            config,
            client,
            settle: DEFAULT_SETTLE,
            check_mode: false,
        }
    }

    /// Sets the wait between delete and create during an update.
    pub fn with_settle(mut self, settle: Duration) -> Self {
        self.settle = settle;
        self
    }

    /// In check mode the pass decides what to do but changes nothing.
    pub fn with_check_mode(mut self, check_mode: bool) -> Self {
        self.check_mode = check_mode;
        self
    }

    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// The kind/name pairs managed for this router.
    pub fn parts(&self) -> Vec<Part> {
        vec![
            Part::new(ResourceKind::DeploymentConfig, &self.config.name),
            Part::new(ResourceKind::Service, &self.config.name),
            Part::new(ResourceKind::ServiceAccount, &self.config.service_account),
            Part::new(ResourceKind::Secret, self.config.secret_name()),
            Part::new(ResourceKind::ClusterRoleBinding, self.config.role_binding_name()),
        ]
    }

    /// Fetches the live parts. Parts that cannot be fetched are absent.
    pub fn observe(&self) -> Result<Bundle, RouterError> {
        let mut observed = Bundle::new();
        for part in self.parts() {
            let out = self.client.get(part.kind, &part.name, None)?;
            let live = out
                .success()
                .then(|| out.result_list().into_iter().find(Value::is_map))
                .flatten();
            match live {
                Some(doc) => {
                    observed.insert(ManagedResource::new(part.kind, part.name, Document::new(doc)))
                }
                None => debug!(kind = %part.kind, name = %part.name, "part not found"),
            }
        }
        Ok(observed)
    }

    /// Renders the desired bundle and applies the configured edits.
    pub fn prepare(&self) -> Result<Bundle, RouterError> {
        let pem = self.certificate_bundle()?;
        let options = self
            .config
            .to_option_list(pem.as_ref().map(TempArtifact::path));
        let out = self.client.render_router(&self.config.name, &options)?;
        drop(pem);

        if !out.success() {
            return Err(RouterError::RenderingFailed(format!(
                "'{}' exited with {}: {}",
                out.cmd,
                out.returncode,
                out.stderr.trim()
            )));
        }
        if let Some(err) = &out.decode_error {
            return Err(RouterError::RenderingFailed(format!(
                "dry-run output is not JSON: {}",
                err
            )));
        }

        let items = out
            .results
            .get("items")
            .and_then(Value::as_list)
            .cloned()
            .ok_or_else(|| {
                RouterError::RenderingFailed("dry-run output has no items".to_string())
            })?;

        let mut rendered = Bundle::from_items(items);
        for kind in [
            ResourceKind::DeploymentConfig,
            ResourceKind::Service,
            ResourceKind::ServiceAccount,
        ] {
            if !rendered.contains(kind) {
                return Err(RouterError::RenderingFailed(format!("dry-run produced no {}", kind)));
            }
        }

        self.add_modifications(&mut rendered)?;
        Ok(rendered)
    }

    /// Concatenates the configured certificate, key and CA certificate.
    fn certificate_bundle(&self) -> Result<Option<TempArtifact>, RouterError> {
        let (Some(cert), Some(key)) = (&self.config.cert_file, &self.config.key_file) else {
            return Ok(None);
        };

        let mut sources = vec![cert.clone(), key.clone()];
        if let Some(cacert) = self.config.cacert_file.as_ref().filter(|p| p.exists()) {
            sources.push(cacert.clone());
        }

        TempArtifact::concat("router-", ".pem", &sources)
            .map(Some)
            .map_err(|e| match e {
                ArtifactError::Read { path, source } => RouterError::Certificate { path, source },
                other => other.into(),
            })
    }

    /// Applies the configured edits to the rendered deployment config.
    ///
    /// Fails when edits were given and none of them changed anything.
    pub fn add_modifications(&self, rendered: &mut Bundle) -> Result<(), RouterError> {
        if self.config.edits.is_empty() {
            return Ok(());
        }

        let dc = rendered
            .get_mut(ResourceKind::DeploymentConfig)
            .ok_or_else(|| {
                RouterError::RenderingFailed("dry-run produced no DeploymentConfig".to_string())
            })?;

        let mut changed = false;
        for edit in &self.config.edits {
            let applied = edit.apply(&mut dc.document)?;
            debug!(key = %edit.key, changed = applied, "applied edit");
            changed |= applied;
        }

        if !changed {
            return Err(RouterError::EditsMadeNoChange);
        }
        Ok(())
    }

    /// Creates every rendered part. Parts that already exist are tolerated.
    pub fn create(&self, rendered: &Bundle) -> Result<Vec<CliOutput>, RouterError> {
        let mut outputs = Vec::with_capacity(rendered.len());
        for resource in rendered.iter() {
            let artifact =
                TempArtifact::from_document(&format!("{}-", resource.kind), &resource.document)?;
            let out = self.client.create(artifact.path())?;
            if out.failed_with(ALREADY_EXISTS) {
                warn!(kind = %resource.kind, name = %resource.name, "part already exists");
            }
            outputs.push(out);
        }
        check_outputs("create", outputs, ALREADY_EXISTS)
    }

    /// Deletes every managed part. Parts that are already gone are tolerated.
    pub fn delete(&self) -> Result<Vec<CliOutput>, RouterError> {
        let mut outputs = Vec::new();
        for part in self.parts() {
            let out = self.client.delete(part.kind, &part.name, None)?;
            if out.failed_with(NOT_FOUND) {
                warn!(kind = %part.kind, name = %part.name, "part already deleted");
            }
            outputs.push(out);
        }
        check_outputs("delete", outputs, NOT_FOUND)
    }

    /// Replaces the router: delete everything, wait, create again.
    pub fn update(&self, rendered: &Bundle) -> Result<Vec<CliOutput>, RouterError> {
        let mut outputs = self.delete()?;
        info!(seconds = self.settle.as_secs_f64(), "waiting for deleted parts to settle");
        thread::sleep(self.settle);
        outputs.extend(self.create(rendered)?);
        Ok(outputs)
    }

    /// Reports whether the live parts drifted from the rendered ones.
    pub fn needs_update(&self, observed: &Bundle, rendered: &Bundle) -> Result<bool, RouterError> {
        let (Some(live_dc), Some(live_svc), Some(live_sa), Some(live_secret)) = (
            observed.get(ResourceKind::DeploymentConfig),
            observed.get(ResourceKind::Service),
            observed.get(ResourceKind::ServiceAccount),
            observed.get(ResourceKind::Secret),
        ) else {
            return Ok(true);
        };

        let secrets_skip = SkipKeys::server_populated().with(SERVICE_ACCOUNT_SKIP);
        if drifted(required(rendered, ResourceKind::ServiceAccount)?, live_sa, &secrets_skip) {
            return Ok(true);
        }

        // The certificate secret is only rendered when certificates are given.
        if let Some(want_secret) = rendered.get(ResourceKind::Secret) {
            if drifted(want_secret, live_secret, &secrets_skip) {
                return Ok(true);
            }
        }

        let mut want_svc = required(rendered, ResourceKind::Service)?.clone();
        if let Some(mut svc) = want_svc.service() {
            svc.force_port_protocol("TCP")?;
        }
        let service_skip = SkipKeys::server_populated().with(SERVICE_SKIP);
        if drifted(&want_svc, live_svc, &service_skip) {
            return Ok(true);
        }

        let mut want_dc = required(rendered, ResourceKind::DeploymentConfig)?.clone();
        self.normalize_deployment(&mut want_dc, live_dc)?;
        let deployment_skip = SkipKeys::server_populated().with(DEPLOYMENT_SKIP);
        Ok(drifted(&want_dc, live_dc, &deployment_skip))
    }

    /// Aligns fields of a rendered deployment config that the dry-run cannot
    /// reproduce: a generated stats password and the default port protocol.
    fn normalize_deployment(
        &self,
        desired: &mut ManagedResource,
        observed: &ManagedResource,
    ) -> Result<(), RouterError> {
        let generated_password = self.config.stats_password.as_deref().map_or(true, str::is_empty);
        let live_password =
            DeploymentConfig::new(&mut observed.document.clone()).env_value(STATS_PASSWORD);

        if let Some(mut dc) = desired.deployment() {
            if generated_password && dc.exists_env_key(STATS_PASSWORD) {
                if let Some(password) = live_password {
                    dc.update_env_var(STATS_PASSWORD, password)?;
                }
            }
            dc.default_port_protocol("TCP")?;
        }
        Ok(())
    }

    /// Runs one reconciliation pass towards the configured state.
    pub fn run(&self) -> Result<Status, RouterError> {
        let state = self.config.state;
        let observed = self.observe()?;

        match state {
            State::Absent => {
                if observed.is_empty() {
                    info!(name = %self.config.name, "router already absent");
                    return Ok(Status::unchanged(state));
                }
                self.perform(state, Action::Delete, None)
            }
            State::Present if !observed.exists() => {
                if self.check_mode {
                    return Ok(Status::check_mode(state, Action::Create));
                }
                let rendered = self.prepare()?;
                self.perform(state, Action::Create, Some(&rendered))
            }
            State::Present => {
                let rendered = self.prepare()?;
                if !self.needs_update(&observed, &rendered)? {
                    info!(name = %self.config.name, "router is up to date");
                    return Ok(Status::unchanged(state));
                }
                self.perform(state, Action::Update, Some(&rendered))
            }
        }
    }

    fn perform(
        &self,
        state: State,
        action: Action,
        rendered: Option<&Bundle>,
    ) -> Result<Status, RouterError> {
        if self.check_mode {
            return Ok(Status::check_mode(state, action));
        }

        info!(
            %action,
            name = %self.config.name,
            namespace = %self.config.namespace,
            "reconciling router"
        );
        let empty = Bundle::new();
        let rendered = rendered.unwrap_or(&empty);
        let results = match action {
            Action::Create => self.create(rendered)?,
            Action::Update => self.update(rendered)?,
            Action::Delete => self.delete()?,
            Action::NoOp => return Ok(Status::unchanged(state)),
        };
        Ok(Status::changed(state, results))
    }
}

fn required(bundle: &Bundle, kind: ResourceKind) -> Result<&ManagedResource, RouterError> {
    bundle
        .get(kind)
        .ok_or_else(|| RouterError::RenderingFailed(format!("dry-run produced no {}", kind)))
}

fn drifted(desired: &ManagedResource, observed: &ManagedResource, skip: &SkipKeys) -> bool {
    let equal = equal_under_skip(desired.value(), observed.value(), skip);
    if !equal {
        info!(kind = %desired.kind, name = %observed.name, "drift detected");
    }
    !equal
}

/// Fails when any command failed for a reason other than `tolerated`.
fn check_outputs(
    action: &'static str,
    outputs: Vec<CliOutput>,
    tolerated: &str,
) -> Result<Vec<CliOutput>, RouterError> {
    if outputs.iter().any(|o| !o.success() && !o.failed_with(tolerated)) {
        return Err(RouterError::PartsFailed { action, outputs });
    }
    Ok(outputs)
}
