/// Declares a static global `LINK_RECEIVER` protected by a `critical_section` mutex.
///
/// # Arguments
/// - `$ch`: The concrete receive channel type (must implement `ReceiveChannel`)
///
/// # Example
/// ```rust,ignore
/// init_link_receiver!(Uart2Rx);
/// ```
#[macro_export]
macro_rules! init_link_receiver {
    ( $ch:ty ) => {
        pub static LINK_RECEIVER: $crate::critical_section::Mutex<
            core::cell::RefCell<Option<$crate::receiver::FrameReceiver<$ch>>>,
        > = $crate::critical_section::Mutex::new(core::cell::RefCell::new(None));
    };
}

/// Installs a receiver for `$channel` into the global `LINK_RECEIVER`.
///
/// # Example
/// ```rust,ignore
/// main() {
///     setup_link_receiver!(uart2_rx);
/// }
/// ```
///
/// # Notes
/// - Requires `init_link_receiver!` to have been used earlier.
#[macro_export]
macro_rules! setup_link_receiver {
    ( $channel:expr ) => {
        $crate::critical_section::with(|cs| {
            let _ = LINK_RECEIVER
                .borrow(cs)
                .replace(Some($crate::receiver::FrameReceiver::new($channel)));
        });
    };
}

/// Feeds one byte to the global `LINK_RECEIVER` if it has been set up.
///
/// # Example
/// ```rust,ignore
/// #[interrupt]
/// fn UART2_RX() {
///     uart_byte_received!(uart2_read_data());
/// }
/// ```
///
/// # Notes
/// - Safe to call before setup; the byte is dropped.
#[macro_export]
macro_rules! uart_byte_received {
    ( $byte:expr ) => {
        $crate::critical_section::with(|cs| {
            if let Some(receiver) = LINK_RECEIVER.borrow(cs).borrow_mut().as_mut() {
                receiver.on_byte($byte);
            }
        });
    };
}
