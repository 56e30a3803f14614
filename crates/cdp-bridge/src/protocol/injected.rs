// Copyright 2026 Paul Adamson
// Licensed under the Apache License, Version 2.0
//
// In-page routines
//
// Functions evaluated against an element with `Runtime.callFunctionOn`.
// The element is always the first argument. Routines that can refuse the
// element return a message string; `false` means success.

/// `(element, pageJavascriptEnabled, scroll)`: with `scroll`, scrolls the
/// element to the viewport center unless it is already fully visible and
/// returns `false`. Without it, returns the element's intersection ratio
/// with the viewport.
pub(crate) const SCROLL_INTO_VIEW_IF_NEEDED: &str = r#"async (element, pageJavascriptEnabled, scroll) => {
  if (!element.isConnected)
    return 'Node is detached from document';
  if (element.nodeType !== Node.ELEMENT_NODE)
    return 'Node is not of type HTMLElement';
  if (scroll && !pageJavascriptEnabled) {
    element.scrollIntoView({ block: 'center', inline: 'center', behavior: 'instant' });
    return false;
  }
  const visibleRatio = await new Promise(resolve => {
    const observer = new IntersectionObserver(entries => {
      resolve(entries[0].intersectionRatio);
      observer.disconnect();
    });
    observer.observe(element);
  });
  if (!scroll)
    return visibleRatio;
  if (visibleRatio !== 1.0)
    element.scrollIntoView({ block: 'center', inline: 'center', behavior: 'instant' });
  return false;
}"#;

/// `(element, x, y)`: scrolls the element's window by a delta.
pub(crate) const SCROLL_BY: &str =
    "(element, x, y) => { element.ownerDocument.defaultView.scrollBy(x, y); }";

/// `(element)`: focuses the element.
pub(crate) const FOCUS: &str = r#"element => {
  if (typeof element.focus !== 'function')
    return 'Node is not an HTML or SVG element.';
  element.focus();
  return false;
}"#;

/// `(element, value)`: checks the element can be filled, then selects its
/// content and focuses it.
pub(crate) const FILL_PRECONDITION: &str = r#"(element, value) => {
  if (element.nodeType !== Node.ELEMENT_NODE)
    return 'Node is not of type HTMLElement';
  const name = element.nodeName.toLowerCase();
  if (name === 'input') {
    const input = element;
    const type = (input.getAttribute('type') || '').toLowerCase();
    const textInputTypes = new Set(['', 'email', 'number', 'password', 'search', 'tel', 'text', 'url']);
    if (!textInputTypes.has(type))
      return 'Cannot fill input of type "' + type + '".';
    if (type === 'number' && isNaN(Number(value.trim())))
      return 'Cannot type text into input[type=number].';
    if (input.disabled)
      return 'Cannot fill a disabled input.';
    if (input.readOnly)
      return 'Cannot fill a readonly input.';
    input.select();
    input.focus();
  } else if (name === 'textarea') {
    const textarea = element;
    if (textarea.disabled)
      return 'Cannot fill a disabled textarea.';
    if (textarea.readOnly)
      return 'Cannot fill a readonly textarea.';
    textarea.selectionStart = 0;
    textarea.selectionEnd = textarea.value.length;
    textarea.focus();
  } else if (element.isContentEditable) {
    const range = element.ownerDocument.createRange();
    range.selectNodeContents(element);
    const selection = element.ownerDocument.defaultView.getSelection();
    if (!selection)
      return 'Element belongs to invisible iframe.';
    selection.removeAllRanges();
    selection.addRange(range);
    element.focus();
  } else {
    return 'Element is not an <input>, <textarea> or [contenteditable] element.';
  }
  return false;
}"#;

/// `(element, descriptors, ...optionElements)`: selects matching options
/// and returns the selected values, or a message for non-select elements.
pub(crate) const SELECT_OPTIONS: &str = r#"(element, optionsToSelect, ...elementsToSelect) => {
  if (element.nodeName.toLowerCase() !== 'select')
    return 'Element is not a <select> element.';
  const select = element;
  const options = Array.from(select.options);
  select.value = undefined;
  for (let index = 0; index < options.length; index++) {
    const option = options[index];
    option.selected = elementsToSelect.includes(option) || optionsToSelect.some(optionToSelect => {
      let matches = true;
      if (optionToSelect.value !== undefined)
        matches = matches && optionToSelect.value === option.value;
      if (optionToSelect.label !== undefined)
        matches = matches && optionToSelect.label === option.label;
      if (optionToSelect.index !== undefined)
        matches = matches && optionToSelect.index === index;
      return matches;
    });
    if (option.selected && !select.multiple)
      break;
  }
  select.dispatchEvent(new Event('input', { bubbles: true }));
  select.dispatchEvent(new Event('change', { bubbles: true }));
  return options.filter(option => option.selected).map(option => option.value);
}"#;

/// `(element)`: whether a file input accepts several files, or a message
/// for anything else.
pub(crate) const FILE_INPUT_MULTIPLE: &str = r#"element => {
  if (element.nodeName.toLowerCase() !== 'input' || element.type !== 'file')
    return 'Node is not an HTMLInputElement';
  return element.multiple;
}"#;

/// `(element, payloads)`: replaces the input's file list with base64
/// payloads and fires `input` and `change`.
pub(crate) const SET_INPUT_FILES: &str = r#"(element, payloads) => {
  const transfer = new DataTransfer();
  for (const payload of payloads) {
    const bytes = Uint8Array.from(atob(payload.buffer), c => c.charCodeAt(0));
    transfer.items.add(new File([bytes], payload.name, { type: payload.mimeType }));
  }
  element.files = transfer.files;
  element.dispatchEvent(new Event('input', { bubbles: true }));
  element.dispatchEvent(new Event('change', { bubbles: true }));
  return false;
}"#;

/// `(root, selector)`: first match under `root` or `null`.
pub(crate) const QUERY_SELECTOR: &str = "(root, selector) => root.querySelector(selector)";

/// `(root, selector)`: all matches under `root` as an array.
pub(crate) const QUERY_SELECTOR_ALL: &str =
    "(root, selector) => Array.from(root.querySelectorAll(selector))";

/// `(root, expression)`: XPath matches under `root` as an array.
pub(crate) const QUERY_XPATH: &str = r#"(root, expression) => {
  const document = root.ownerDocument || root;
  const iterator = document.evaluate(expression, root, null, XPathResult.ORDERED_NODE_ITERATOR_TYPE);
  const array = [];
  let item;
  while ((item = iterator.iterateNext()))
    array.push(item);
  return array;
}"#;

