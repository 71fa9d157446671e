use std::ffi::{c_void, CString};

use ash::vk;
use ash::vk::Handle;

use crate::driver::records::MessengerRecord;
use crate::driver::state::DriverState;

/// Message id name attached to everything the driver itself reports.
pub const DRIVER_MESSAGE_ID: &str = "MockIcd";

/// A callback invocation queued while the driver is locked.
#[derive(Debug)]
pub struct PendingMessage {
    callback: vk::PFN_vkDebugUtilsMessengerCallbackEXT,
    user_data: *mut c_void,
    severity: vk::DebugUtilsMessageSeverityFlagsEXT,
    types: vk::DebugUtilsMessageTypeFlagsEXT,
    message_id_name: CString,
    message: CString,
}

impl PendingMessage {
    /// Invokes the application callback. Must run without the driver locked so the
    /// callback may call back into the driver.
    pub fn deliver(self) {
        let Some(callback) = self.callback else {
            return;
        };
        let data = vk::DebugUtilsMessengerCallbackDataEXT {
            p_message_id_name: self.message_id_name.as_ptr(),
            p_message: self.message.as_ptr(),
            ..Default::default()
        };
        // SAFETY: the callback and user data were supplied together by the application when
        // the messenger was created.
        unsafe {
            callback(self.severity, self.types, &data, self.user_data);
        }
    }
}

fn to_cstring(text: &str) -> CString {
    CString::new(text.replace('\0', " ")).unwrap_or_default()
}

impl DriverState {
    pub fn create_debug_messenger(
        &mut self,
        instance: vk::Instance,
        severity: vk::DebugUtilsMessageSeverityFlagsEXT,
        types: vk::DebugUtilsMessageTypeFlagsEXT,
        callback: vk::PFN_vkDebugUtilsMessengerCallbackEXT,
        user_data: *mut c_void,
    ) -> vk::DebugUtilsMessengerEXT {
        self.expect_instance(instance, "vkCreateDebugUtilsMessengerEXT");
        let raw = self.messengers.insert(MessengerRecord {
            instance,
            severity,
            types,
            callback,
            user_data,
        });
        log::debug!("Created debug messenger {:#x}", raw);
        vk::DebugUtilsMessengerEXT::from_raw(raw)
    }

    pub fn destroy_debug_messenger(&mut self, messenger: vk::DebugUtilsMessengerEXT) {
        if messenger == vk::DebugUtilsMessengerEXT::null() {
            return;
        }
        if self.messengers.remove(messenger.as_raw()).is_none() {
            crate::contract::violation(format_args!(
                "destroying unknown debug messenger {:#x}",
                messenger.as_raw()
            ));
        }
    }

    /// Queues `message` for every messenger of `instance` whose masks match. A null instance
    /// reaches every messenger.
    pub fn queue_debug_message(
        &mut self,
        instance: vk::Instance,
        severity: vk::DebugUtilsMessageSeverityFlagsEXT,
        types: vk::DebugUtilsMessageTypeFlagsEXT,
        message_id_name: &str,
        message: &str,
    ) {
        let targets: Vec<MessengerRecord> = self
            .messengers
            .iter()
            .map(|(_, record)| *record)
            .filter(|record| {
                (instance == vk::Instance::null() || record.instance == instance)
                    && record.severity.intersects(severity)
                    && record.types.intersects(types)
            })
            .collect();
        for record in targets {
            self.pending_messages.push(PendingMessage {
                callback: record.callback,
                user_data: record.user_data,
                severity,
                types,
                message_id_name: to_cstring(message_id_name),
                message: to_cstring(message),
            });
        }
    }

    /// Reports an informational driver message, e.g. "vkCreateDevice called".
    pub fn log_driver_message(&mut self, instance: vk::Instance, message: &str) {
        log::info!("{}", message);
        self.queue_debug_message(
            instance,
            vk::DebugUtilsMessageSeverityFlagsEXT::INFO,
            vk::DebugUtilsMessageTypeFlagsEXT::GENERAL,
            DRIVER_MESSAGE_ID,
            message,
        );
    }

    pub fn take_pending_messages(&mut self) -> Vec<PendingMessage> {
        std::mem::take(&mut self.pending_messages)
    }

    /// Delivers queued messages. Only for callers that own the state outright; the C entry
    /// points deliver after releasing the lock instead.
    pub fn deliver_pending_messages(&mut self) {
        for message in self.take_pending_messages() {
            message.deliver();
        }
    }
}
