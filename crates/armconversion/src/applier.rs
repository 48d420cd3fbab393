//! Attaches the ARM conversion capability to every Kubernetes-facing object
//! that has a wire twin: resource specs (after owner injection and name
//! promotion), status objects, and the ordinary objects they reach.

use std::collections::BTreeSet;

use anyhow::{anyhow, bail, Context, Result};
use armgen_astmodel::prelude::*;
use armgen_config::{ConfigResultExt, ObjectModelConfiguration};
use tracing::{debug, info};

pub struct ArmConversionApplier<'a> {
    definitions: &'a TypeDefinitionSet,
    id_factory: &'a IdentifierFactory,
    config: &'a ObjectModelConfiguration,
}

impl<'a> ArmConversionApplier<'a> {
    pub fn new(definitions: &'a TypeDefinitionSet, id_factory: &'a IdentifierFactory, config: &'a ObjectModelConfiguration) -> Self {
        Self { definitions, id_factory, config }
    }

    /// Produces the full set with capabilities attached; definitions needing no change pass through.
    pub fn transform_types(&self) -> Result<TypeDefinitionSet> {
        let mut result = TypeDefinitionSet::new();
        let specs = self.transform_resource_specs()?;
        let statuses = self.transform_resource_statuses()?;
        result.add_types(&specs)?;
        result.add_types(&statuses)?;

        let required = self.requires_arm_type();
        let mut ordinary = 0usize;
        for def in self.definitions.except(&result).iter() {
            let needs_conversion =
                def.ty().as_object().is_some() && !def.ty().has_flag(TypeFlag::Arm) && required.contains(def.name());
            if !needs_conversion {
                result.add(def.clone())?;
                continue;
            }
            let arm_def = self.arm_definition(def.name())?;
            let modified = self
                .add_arm_conversion(def, arm_def, ConversionKind::Ordinary)
                .with_context(|| format!("failed to add ARM conversion capability to {}", def.name()))?;
            result.add(modified)?;
            ordinary += 1;
        }

        info!(specs = specs.len(), statuses = statuses.len(), ordinary, "attached ARM conversion capabilities");
        Ok(result)
    }

    fn transform_resource_specs(&self) -> Result<TypeDefinitionSet> {
        let mut result = TypeDefinitionSet::new();
        for (def, resource) in self.definitions.resources() {
            let spec = self.transform_spec(def, resource).with_context(|| format!("resource {}", def.name()))?;
            let arm_def = self.arm_definition(spec.name())?;
            let spec = self.add_arm_conversion(&spec, arm_def, ConversionKind::Spec)?;
            result.add(spec)?;
        }
        Ok(result)
    }

    fn transform_resource_statuses(&self) -> Result<TypeDefinitionSet> {
        let mut result = TypeDefinitionSet::new();
        let statuses = self
            .definitions
            .filter(|d| d.ty().as_object().is_some() && d.name().is_status() && !d.ty().has_flag(TypeFlag::Arm));
        for def in statuses.iter() {
            let arm_def = self.arm_definition(def.name())?;
            result.add(self.add_arm_conversion(def, arm_def, ConversionKind::Status)?)?;
        }
        Ok(result)
    }

    /// Objects reachable from any resource spec or status, not following Kubernetes-only properties.
    fn requires_arm_type(&self) -> BTreeSet<TypeName> {
        let roots: Vec<TypeName> = self
            .definitions
            .resources()
            .flat_map(|(_, r)| r.spec_name().into_iter().chain(r.status_name()).cloned())
            .collect();
        self.definitions.connected_to_where(roots, &|p| !p.is_kubernetes_only())
    }

    /// Injects the owner and promotes `Name` to `AzureName` on the spec of `resource`.
    fn transform_spec(&self, resource_def: &TypeDefinition, resource: &ResourceType) -> Result<TypeDefinition> {
        let spec_def = self.definitions.resolve_resource_spec(resource)?;
        if spec_def.ty().as_object().is_some_and(|o| o.has_capability(CapabilityKind::ArmConversion)) {
            return Ok(spec_def.clone());
        }

        let defaults_azure_name = match spec_def.ty().as_object() {
            Some(o) if o.has_property(PropertyName::NAME) => {
                self.config.default_azure_name(resource_def.name()).optional()?.unwrap_or(true)
            }
            _ => true,
        };

        let remap_properties = |o: &ObjectType| -> Result<ObjectType> {
            let Some(name) = o.property(PropertyName::NAME) else { return Ok(o.clone()) };
            let azure_name = self.azure_name_property(name.ty().unwrap_optional().clone(), !defaults_azure_name);
            let mut out = o.clone().without_property(PropertyName::NAME).with_property(azure_name);
            if defaults_azure_name {
                out = out.with_capability(Capability::AzureNameDefaulter);
            }
            Ok(out)
        };

        let inject_owner = |o: &ObjectType| -> Result<ObjectType> {
            match (resource.owner(), resource.scope()) {
                (Some(owner), ResourceScope::ResourceGroup) => Ok(o.clone().with_property(self.owner_property(owner)?)),
                (_, ResourceScope::Extension) => Ok(o.clone().with_property(self.extension_owner_property())),
                _ => Ok(o.clone()),
            }
        };

        let steps: [&dyn Fn(&ObjectType) -> Result<ObjectType>; 2] = [&remap_properties, &inject_owner];
        spec_def.apply_object_transformations(&steps).context("remapping properties of Kubernetes definition")
    }

    fn add_arm_conversion(&self, kube_def: &TypeDefinition, arm_def: &TypeDefinition, kind: ConversionKind) -> Result<TypeDefinition> {
        if kube_def.name() == arm_def.name() || kube_def.ty().has_flag(TypeFlag::Arm) {
            bail!("cannot convert {} onto itself: it is already the wire shape", kube_def.name());
        }
        if arm_def.ty().as_object().is_none() {
            bail!("ARM definition {} did not define an object type", arm_def.name());
        }
        if kube_def.ty().as_object().is_some_and(|o| o.has_capability(CapabilityKind::ArmConversion)) {
            return Ok(kube_def.clone());
        }

        let payload = self
            .config
            .payload_type(kube_def.name().package())
            .optional()
            .with_context(|| format!("looking up payload type for {}", kube_def.name()))?
            .unwrap_or_default();

        let capability = Capability::ArmConversion(ArmConversion { arm_type: arm_def.name().clone(), kind, payload });
        debug!(name = %kube_def.name(), arm = %arm_def.name(), ?kind, ?payload, "attaching ARM conversion");
        kube_def
            .apply_object_transformation(|o| Ok::<_, anyhow::Error>(o.clone().with_capability(capability)))
            .with_context(|| format!("failed to add ARM conversion capability to Kubernetes definition {}", kube_def.name()))
    }

    fn arm_definition(&self, name: &TypeName) -> Result<&'a TypeDefinition> {
        let arm_name = self.id_factory.create_arm_type_name(name);
        self.definitions
            .get(&arm_name)
            .ok_or_else(|| anyhow!("couldn't find ARM definition matching kube name {name}"))
    }

    fn owner_property(&self, owner: &TypeName) -> Result<PropertyDefinition> {
        let group = owner
            .package()
            .kubernetes_group()
            .ok_or_else(|| anyhow!("owner {owner} is not in an API group package"))?;
        let kind = owner.name();
        Ok(PropertyDefinition::new(
            self.id_factory.create_property_name(PropertyName::OWNER, Visibility::Exported),
            self.id_factory.create_identifier(PropertyName::OWNER, Visibility::NotExported),
            Type::optional(Type::name(runtime::known_resource_reference())),
        )
        .with_description(format!(
            "The owner of the resource. The owner controls where the resource goes when it is deployed. \
             The owner also controls the resources lifecycle. When the owner is deleted the resource will also be deleted. \
             Owner is expected to be a reference to a {group}/{kind} resource"
        ))
        .with_tag(OWNER_GROUP_TAG, group.clone())
        .with_tag(OWNER_KIND_TAG, kind)
        .make_required())
    }

    fn extension_owner_property(&self) -> PropertyDefinition {
        PropertyDefinition::new(
            self.id_factory.create_property_name(PropertyName::OWNER, Visibility::Exported),
            self.id_factory.create_identifier(PropertyName::OWNER, Visibility::NotExported),
            Type::optional(Type::name(runtime::arbitrary_owner_reference())),
        )
        .with_description(
            "The owner of the resource. The owner controls where the resource goes when it is deployed. \
             The owner also controls the resources lifecycle. When the owner is deleted the resource will also be deleted. \
             This resource is an extension resource, which means that any other Azure resource can be its owner.",
        )
        .make_required()
    }

    fn azure_name_property(&self, ty: Type, required: bool) -> PropertyDefinition {
        let prop = PropertyDefinition::new(
            self.id_factory.create_property_name(PropertyName::AZURE_NAME, Visibility::Exported),
            self.id_factory.create_identifier(PropertyName::AZURE_NAME, Visibility::NotExported),
            ty,
        )
        .with_description("The name of the resource in Azure. This is often the same as the name of the resource in Kubernetes but it doesn't have to be.");
        if required { prop.make_required() } else { prop }
    }
}
