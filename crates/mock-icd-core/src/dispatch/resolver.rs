use ash::vk;
use ash::vk::Handle;

use crate::dispatch::table::{EntryLevel, GateContext, ProcEntry, Scope};
use crate::dispatch::{VoidFunction, TABLES};
use crate::driver::{DriverState, UsingIcdProvidedWsi, VulkanFunction};
use crate::icd::stubs;

/// First entry named `name` whose table is open in `context` and that `accept` lets through.
fn open_entry(
    scope: &Scope,
    name: &str,
    context: &GateContext<'_>,
    accept: impl Fn(&ProcEntry) -> bool,
) -> Option<ProcEntry> {
    scope
        .candidates(name)
        .find(|(table, entry)| {
            accept(*entry)
                && table.gate.is_open(context)
                && (!entry.icd_wsi || context.state.provides_icd_wsi())
        })
        .map(|(_, entry)| *entry)
}

fn find_custom(functions: &[VulkanFunction], name: &str) -> Option<VoidFunction> {
    functions
        .iter()
        .find(|function| function.name == name)
        .map(|function| function.function)
}

impl DriverState {
    fn global_context(&self) -> GateContext<'_> {
        GateContext {
            state: self,
            api_version: self.api_version,
            instance_extensions: None,
            device_extensions: None,
        }
    }

    fn instance_context(&self, instance: vk::Instance) -> Option<GateContext<'_>> {
        let record = self.instance(instance)?;
        Some(GateContext {
            state: self,
            api_version: record.api_version,
            instance_extensions: Some(&record.enabled_extensions),
            device_extensions: None,
        })
    }

    /// Global, instance and device-core tables for a live instance. Device extension tables stay
    /// closed because no device extensions are in scope.
    fn lookup_instance_scope(
        &self,
        instance: vk::Instance,
        name: &str,
        accept: impl Fn(&ProcEntry) -> bool + Copy,
    ) -> Option<ProcEntry> {
        let context = self.instance_context(instance)?;
        open_entry(&TABLES.global, name, &context, accept)
            .or_else(|| open_entry(&TABLES.instance, name, &context, accept))
            .or_else(|| open_entry(&TABLES.device, name, &context, accept))
    }

    /// Records the WSI side effect and hands out the function.
    fn hand_out(&mut self, entry: ProcEntry) -> VoidFunction {
        if entry.icd_wsi && self.is_using_icd_wsi == UsingIcdProvidedWsi::NotUsing {
            log::info!("Loader is using driver-provided WSI ({})", entry.name);
            self.is_using_icd_wsi = UsingIcdProvidedWsi::IsUsing;
        }
        entry.function
    }

    /// `vkGetInstanceProcAddr`. A null instance only reaches the global table; an instance the
    /// driver never created reaches nothing.
    pub fn resolve_instance_proc(&mut self, instance: vk::Instance, name: &str) -> vk::PFN_vkVoidFunction {
        if instance == vk::Instance::null() {
            let found = open_entry(&TABLES.global, name, &self.global_context(), |_| true);
            log::debug!("Resolved global '{}': {}", name, found.is_some());
            return found.map(|entry| self.hand_out(entry));
        }
        if self.instance(instance).is_none() {
            log::debug!("Refusing '{}' for unknown instance {:#x}", name, instance.as_raw());
            return None;
        }
        let found = self.lookup_instance_scope(instance, name, |_| true);
        let function = match found {
            Some(entry) => Some(self.hand_out(entry)),
            None => find_custom(&self.custom_instance_functions, name),
        };
        log::debug!("Resolved instance '{}': {}", name, function.is_some());
        function
    }

    /// `vk_icdGetPhysicalDeviceProcAddr`: instance scope restricted to physical-device entries,
    /// then the custom physical-device functions.
    pub fn resolve_physical_device_proc(&mut self, instance: vk::Instance, name: &str) -> vk::PFN_vkVoidFunction {
        if self.instance(instance).is_none() {
            log::debug!("Refusing physical device '{}' for instance {:#x}", name, instance.as_raw());
            return None;
        }
        let found = self.lookup_instance_scope(instance, name, |entry| entry.level == EntryLevel::PhysicalDevice);
        let function = match found {
            Some(entry) => Some(self.hand_out(entry)),
            None => find_custom(&self.custom_physical_device_functions, name),
        };
        log::debug!("Resolved physical device '{}': {}", name, function.is_some());
        function
    }

    /// `vkGetDeviceProcAddr`. Unknown or destroyed devices resolve nothing.
    pub fn resolve_device_proc(&mut self, device: vk::Device, name: &str) -> vk::PFN_vkVoidFunction {
        let Some(record) = self.device(device) else {
            log::debug!("Refusing '{}' for unknown device {:#x}", name, device.as_raw());
            return None;
        };
        let context = GateContext {
            state: self,
            api_version: record.api_version,
            instance_extensions: None,
            device_extensions: Some(&record.enabled_extensions),
        };
        let found = open_entry(&TABLES.device, name, &context, |_| true);
        let function = match found {
            Some(entry) => Some(entry.function),
            None => {
                let descriptor = self.physical_device(record.physical_device);
                find_custom(&descriptor.custom_functions, name).or_else(|| {
                    descriptor
                        .known_device_functions
                        .iter()
                        .any(|known| known == name)
                        .then(|| as_stub(stubs::stub_with_result))
                })
            }
        };
        log::debug!("Resolved device '{}': {}", name, function.is_some());
        function
    }
}

fn as_stub(stub: unsafe extern "system" fn() -> vk::Result) -> VoidFunction {
    // SAFETY: the caller casts the pointer back to the signature it expects; the stub ignores
    // its arguments.
    unsafe { std::mem::transmute::<unsafe extern "system" fn() -> vk::Result, VoidFunction>(stub) }
}
